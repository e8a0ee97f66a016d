//! Schema-driven random query generation.
//!
//! Given an introspected [`Schema`], [`QueryGenerator`] builds a syntactically
//! valid `query` or `mutation` document by walking type references from a root
//! operation type. The document is valid by construction:
//!
//! * every composite field gets a non-empty selection set (falling back to
//!   `__typename` when nothing else can be selected),
//! * union members are selected through inline fragments,
//! * every `$variable` in the body has exactly one declaration.
//!
//! Selection-set nesting below a root field is bounded by
//! [`GeneratorOptions::max_depth`]; once the bound is reached only leaf
//! (scalar or enum) fields are selected. Options are clamped to
//! [`defaults::GENERATOR_MAX_DEPTH_LIMIT`] and
//! [`defaults::GENERATOR_MAX_FIELDS_LIMIT`], and a document never selects more
//! than [`defaults::GENERATOR_MAX_SELECTIONS`] fields in total.
use crate::{
    introspection::{Field, FullType, InputValue, OperationKind, Schema},
    type_ref::{TypeKind, TypeRef},
    GraphqlError, GraphqlResult,
};
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use tap_lib::defaults;
use tracing::debug;

const INDENT: &str = "  ";

/// Inline value used for `String`, `ID` and custom scalars.
const STRING_PLACEHOLDER: &str = "\"sample\"";

const OPTIONAL_ARGUMENT_PROBABILITY: f64 = 0.5;
const ENUM_VARIABLE_PROBABILITY: f64 = 0.7;
const SCALAR_VARIABLE_PROBABILITY: f64 = 0.3;

/// How variable names are derived from argument names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableNaming {
    /// `snake_case` of the argument name. Two arguments with the same name at
    /// different places in the document share one variable, and the last one
    /// visited decides its declared type and default.
    #[default]
    ArgumentName,

    /// `snake_case` of the field path followed by the argument name, e.g.
    /// `missionary_assignments_first`. Fields reached through an inline
    /// fragment include the member type, e.g. `search_on_mission_name_first`,
    /// so names never collide.
    FieldPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Maximum number of selection sets nested below the operation.
    pub max_depth: usize,

    /// Maximum number of fields selected per selection set.
    pub max_fields: usize,

    /// Maximum number of root fields selected by a query.
    pub max_root_fields: usize,

    pub variable_naming: VariableNaming,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            max_depth: defaults::GENERATOR_MAX_DEPTH,
            max_fields: defaults::GENERATOR_MAX_FIELDS,
            max_root_fields: defaults::GENERATOR_MAX_ROOT_FIELDS,
            variable_naming: VariableNaming::default(),
        }
    }
}

/// A variable declared by a generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub name: String,
    pub declared_type: String,
    pub default_value: Option<String>,
}

impl fmt::Display for VariableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}: {}", self.name, self.declared_type)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuery {
    pub operation: OperationKind,
    pub operation_name: String,
    pub document: String,
    pub variables: Vec<VariableDefinition>,
}

/// Variables accumulated during one generation pass, in first-seen order.
#[derive(Debug, Default)]
struct Variables(Vec<VariableDefinition>);

impl Variables {
    fn register(&mut self, definition: VariableDefinition) {
        match self.0.iter_mut().find(|v| v.name == definition.name) {
            Some(existing) => {
                if existing.declared_type != definition.declared_type {
                    debug!(
                        "Variable ${} redeclared as {} (was {})",
                        definition.name, definition.declared_type, existing.declared_type
                    );
                }
                *existing = definition;
            }
            None => self.0.push(definition),
        }
    }
}

pub struct QueryGenerator<'a, R> {
    schema: &'a Schema,
    types: HashMap<&'a str, &'a FullType>,
    options: GeneratorOptions,
    rng: R,
    selected: usize,
}

impl<'a, R: Rng> QueryGenerator<'a, R> {
    pub fn new(schema: &'a Schema, rng: R) -> Self {
        Self {
            schema,
            types: schema.type_map(),
            options: GeneratorOptions::default(),
            rng,
            selected: 0,
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = GeneratorOptions {
            max_depth: options
                .max_depth
                .clamp(1, defaults::GENERATOR_MAX_DEPTH_LIMIT),
            max_fields: options
                .max_fields
                .clamp(1, defaults::GENERATOR_MAX_FIELDS_LIMIT),
            max_root_fields: options
                .max_root_fields
                .clamp(1, defaults::GENERATOR_MAX_FIELDS_LIMIT),
            variable_naming: options.variable_naming,
        };
        self
    }

    /// Generate one document for the given operation.
    pub fn generate(&mut self, operation: OperationKind) -> GraphqlResult<GeneratedQuery> {
        let schema = self.schema;
        let root_name = schema
            .root_type_name(operation)
            .ok_or(GraphqlError::MissingRootType(operation))?;
        let root = self.lookup(root_name)?;

        let eligible = root.eligible_fields();
        if eligible.is_empty() {
            return Err(GraphqlError::NoEligibleFields(root_name.to_string()));
        }

        let count = match operation {
            OperationKind::Mutation => 1,
            OperationKind::Query => {
                let max = self.options.max_root_fields.min(eligible.len());
                self.rng.gen_range(1..=max)
            }
        };
        let chosen = self.choose(&eligible, count);

        self.selected = 0;
        let mut variables = Variables::default();
        let mut body = String::new();
        for field in chosen.iter().copied() {
            self.write_field(&mut body, field, &[], 0, 1, &mut variables)?;
        }

        let operation_name = operation_name(operation, &chosen);
        let mut document = format!("{operation} {operation_name}");
        if !variables.0.is_empty() {
            let declarations = variables
                .0
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            document.push_str(&format!("({declarations})"));
        }
        document.push_str(" {\n");
        document.push_str(&body);
        document.push('}');

        debug!(
            "Generated {operation} {operation_name} with {} root field(s) and {} variable(s)",
            chosen.len(),
            variables.0.len()
        );

        Ok(GeneratedQuery {
            operation,
            operation_name,
            document,
            variables: variables.0,
        })
    }

    fn lookup(&self, name: &str) -> GraphqlResult<&'a FullType> {
        self.types
            .get(name)
            .copied()
            .ok_or_else(|| GraphqlError::UnrecognizedType(name.to_string()))
    }

    /// Pick `count` items at random, preserving their original order.
    fn choose<T: Copy>(&mut self, items: &[T], count: usize) -> Vec<T> {
        if count >= items.len() {
            return items.to_vec();
        }
        let mut picked = index::sample(&mut self.rng, items.len(), count).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| items[i]).collect()
    }

    /// Write `field` as a member of a selection set at nesting `level`.
    fn write_field(
        &mut self,
        out: &mut String,
        field: &'a Field,
        parent_path: &[&'a str],
        level: usize,
        indent: usize,
        variables: &mut Variables,
    ) -> GraphqlResult<()> {
        self.selected += 1;
        let mut path = parent_path.to_vec();
        path.push(field.name.as_str());

        out.push_str(&INDENT.repeat(indent));
        out.push_str(&field.name);

        let arguments = self.arguments(field, &path, variables);
        if !arguments.is_empty() {
            out.push_str(&format!("({})", arguments.join(", ")));
        }

        let base = field.ty.unwrap();
        if base.kind.is_composite() {
            out.push_str(" {\n");
            self.write_selection_set(
                out,
                base.kind,
                base.name,
                &path,
                level + 1,
                indent + 1,
                variables,
            )?;
            out.push_str(&INDENT.repeat(indent));
            out.push_str("}\n");
        } else {
            out.push('\n');
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_selection_set(
        &mut self,
        out: &mut String,
        kind: TypeKind,
        type_name: &'a str,
        path: &[&'a str],
        level: usize,
        indent: usize,
        variables: &mut Variables,
    ) -> GraphqlResult<()> {
        let ty = self.lookup(type_name)?;

        if kind != TypeKind::Union {
            return self.write_fields_of(out, ty, path, level, indent, variables);
        }

        // Unions have no fields of their own; select through their members.
        write_typename(out, indent);
        let members: Vec<&'a str> = ty
            .possible_types
            .iter()
            .flatten()
            .map(TypeRef::base_name)
            .collect();
        let count = members.len().min(self.options.max_fields);
        for member in self.choose(&members, count) {
            let member_ty = self.lookup(member)?;
            out.push_str(&INDENT.repeat(indent));
            out.push_str(&format!("... on {member} {{\n"));
            let mut member_path = path.to_vec();
            member_path.extend(["on", member]);
            self.write_fields_of(out, member_ty, &member_path, level, indent + 1, variables)?;
            out.push_str(&INDENT.repeat(indent));
            out.push_str("}\n");
        }

        Ok(())
    }

    fn write_fields_of(
        &mut self,
        out: &mut String,
        ty: &'a FullType,
        path: &[&'a str],
        level: usize,
        indent: usize,
        variables: &mut Variables,
    ) -> GraphqlResult<()> {
        // A composite field here would open selection set `level + 1`.
        let allow_composite = level < self.options.max_depth;
        let candidates: Vec<&'a Field> = ty
            .eligible_fields()
            .into_iter()
            .filter(|f| allow_composite || f.ty.base_kind().is_leaf())
            .collect();

        let remaining = defaults::GENERATOR_MAX_SELECTIONS.saturating_sub(self.selected);
        if candidates.is_empty() || remaining == 0 {
            write_typename(out, indent);
            return Ok(());
        }

        let count = candidates.len().min(self.options.max_fields).min(remaining);
        for (i, field) in self.choose(&candidates, count).into_iter().enumerate() {
            // Nested selections may have used up the budget; one field keeps the set valid.
            if i > 0 && self.selected >= defaults::GENERATOR_MAX_SELECTIONS {
                break;
            }
            self.write_field(out, field, path, level, indent, variables)?;
        }

        Ok(())
    }

    fn arguments(
        &mut self,
        field: &'a Field,
        path: &[&'a str],
        variables: &mut Variables,
    ) -> Vec<String> {
        let mut rendered = Vec::new();

        for arg in field.args.iter() {
            let required = arg.ty.is_required();
            if !required && !self.rng.gen_bool(OPTIONAL_ARGUMENT_PROBABILITY) {
                continue;
            }

            let value = match self.inline_value(arg) {
                Some(literal) => literal,
                None => {
                    let name = self.variable_name(arg, path);
                    let default_value = self.default_value(&arg.ty);
                    variables.register(VariableDefinition {
                        name: name.clone(),
                        declared_type: arg.ty.to_string(),
                        default_value,
                    });
                    format!("${name}")
                }
            };

            rendered.push(format!("{}: {value}", arg.name));
        }

        rendered
    }

    /// An inline literal for `arg`, or `None` if it should be bound to a variable.
    ///
    /// Required arguments and input objects are always bound to variables.
    fn inline_value(&mut self, arg: &InputValue) -> Option<String> {
        if arg.ty.is_required() {
            return None;
        }

        let variable_probability = match arg.ty.base_kind() {
            TypeKind::Scalar => SCALAR_VARIABLE_PROBABILITY,
            TypeKind::Enum => ENUM_VARIABLE_PROBABILITY,
            _ => return None,
        };
        if self.rng.gen_bool(variable_probability) {
            return None;
        }

        self.literal(&arg.ty)
    }

    /// Default for a nullable, non-list scalar or enum variable.
    fn default_value(&mut self, ty: &TypeRef) -> Option<String> {
        match ty {
            TypeRef::Scalar(_) | TypeRef::Enum(_) => self.literal(ty),
            _ => None,
        }
    }

    fn literal(&mut self, ty: &TypeRef) -> Option<String> {
        match ty {
            TypeRef::NonNull(inner) => self.literal(inner),
            TypeRef::List(inner) => self.literal(inner).map(|v| format!("[{v}]")),
            TypeRef::Scalar(name) => Some(self.scalar_literal(name)),
            TypeRef::Enum(name) => {
                let ty = self.types.get(name.as_str()).copied()?;
                let values = ty.active_enum_values();
                if values.is_empty() {
                    return None;
                }
                let pick = self.rng.gen_range(0..values.len());
                Some(values[pick].name.clone())
            }
            _ => None,
        }
    }

    fn scalar_literal(&mut self, name: &str) -> String {
        match name {
            "Int" => self.rng.gen_range(1i32..=100).to_string(),
            "Float" => format!("{:.2}", self.rng.gen_range(0.0f64..100.0)),
            "Boolean" => self.rng.gen_bool(0.5).to_string(),
            _ => STRING_PLACEHOLDER.to_string(),
        }
    }

    fn variable_name(&self, arg: &InputValue, path: &[&str]) -> String {
        match self.options.variable_naming {
            VariableNaming::ArgumentName => to_snake_case(&arg.name),
            VariableNaming::FieldPath => path
                .iter()
                .copied()
                .chain(std::iter::once(arg.name.as_str()))
                .map(to_snake_case)
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

/// Generate a document using the thread-local random number generator.
pub fn generate_random_query(
    schema: &Schema,
    operation: OperationKind,
    options: GeneratorOptions,
) -> GraphqlResult<GeneratedQuery> {
    QueryGenerator::new(schema, rand::thread_rng())
        .with_options(options)
        .generate(operation)
}

fn write_typename(out: &mut String, indent: usize) {
    out.push_str(&INDENT.repeat(indent));
    out.push_str("__typename\n");
}

fn operation_name(operation: OperationKind, fields: &[&Field]) -> String {
    match (operation, fields) {
        (OperationKind::Query, [field]) => format!("Get{}", capitalize(&field.name)),
        (OperationKind::Query, fields) => format!("GetMultiple{}Fields", fields.len()),
        (OperationKind::Mutation, fields) => {
            let name = fields.first().map(|f| f.name.as_str()).unwrap_or_default();
            format!("Execute{}", capitalize(name))
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `missionaryId` -> `missionary_id`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}
