use crate::cli::GenerateCommand;
use rand::{rngs::StdRng, SeedableRng};
use std::fs;
use tap_graphql::{
    generate_random_query, GeneratedQuery, GeneratorOptions, OperationKind, QueryGenerator,
    Schema, VariableNaming,
};
use tracing::info;

pub fn init(command: GenerateCommand) -> anyhow::Result<()> {
    let verbose = command.verbose;
    let generated = generate(command)?;

    println!("{}", generated.document);

    if verbose && !generated.variables.is_empty() {
        println!("\n{}", serde_json::to_string_pretty(&generated.variables)?);
    }

    Ok(())
}

pub fn generate(
    GenerateCommand {
        schema,
        mutation,
        max_depth,
        max_fields,
        seed,
        namespace_variables,
        ..
    }: GenerateCommand,
) -> anyhow::Result<GeneratedQuery> {
    let json = fs::read_to_string(&schema)?;
    let schema = Schema::from_introspection_json(&json)?;

    info!("Loaded {} types from introspection result", schema.types.len());

    let options = GeneratorOptions {
        max_depth,
        max_fields,
        variable_naming: if namespace_variables {
            VariableNaming::FieldPath
        } else {
            VariableNaming::ArgumentName
        },
        ..Default::default()
    };
    let operation = if mutation {
        OperationKind::Mutation
    } else {
        OperationKind::Query
    };

    let generated = match seed {
        Some(seed) => QueryGenerator::new(&schema, StdRng::seed_from_u64(seed))
            .with_options(options)
            .generate(operation)?,
        None => generate_random_query(&schema, operation, options)?,
    };

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../tap-graphql/tests/fixtures")
            .join(name)
    }

    fn command(schema: PathBuf) -> GenerateCommand {
        GenerateCommand {
            schema,
            mutation: false,
            max_depth: 3,
            max_fields: 5,
            seed: Some(42),
            namespace_variables: false,
            verbose: false,
        }
    }

    #[test]
    fn test_generate_from_fixture() {
        let generated = generate(command(fixture("missionary_introspection.json"))).unwrap();

        assert_eq!(generated.operation_name, "GetMissionary".to_string());
        assert_eq!(
            generated.document,
            "query GetMissionary($id: ID!) {\n  missionary(id: $id) {\n    id\n    name\n  }\n}"
                .to_string()
        );
    }

    #[test]
    fn test_same_seed_same_document() {
        let path = fixture("console_introspection.json");
        let first = generate(command(path.clone())).unwrap();
        let second = generate(command(path)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_mutation_on_schema_without_mutations_fails() {
        let result = generate(GenerateCommand {
            mutation: true,
            ..command(fixture("missionary_introspection.json"))
        });

        assert!(result.is_err());
    }
}
