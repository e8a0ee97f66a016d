use crate::ODataResult;
use http::{
    header::{ACCEPT, AUTHORIZATION},
    HeaderMap, HeaderValue,
};

pub const ODATA_MAX_VERSION: &str = "odata-maxversion";
pub const ODATA_VERSION: &str = "odata-version";
pub const PREFER: &str = "prefer";

/// Headers sent with every OData request.
///
/// `Prefer` always asks for all annotations (`@odata.count`,
/// `@odata.nextLink`, formatted values) and caps the server page size when
/// one is given.
pub fn request_headers(page_size: Option<u32>, access_token: &str) -> ODataResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ODATA_MAX_VERSION, HeaderValue::from_static("4.0"));
    headers.insert(ODATA_VERSION, HeaderValue::from_static("4.0"));

    let mut prefer = String::from("odata.include-annotations=\"*\"");
    if let Some(size) = page_size {
        prefer.push_str(&format!(",odata.maxpagesize={size}"));
    }
    headers.insert(PREFER, HeaderValue::from_str(&prefer)?);

    let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ODataError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_headers() {
        let headers = request_headers(Some(25), "abc").unwrap();

        assert_eq!(headers[ODATA_MAX_VERSION], "4.0");
        assert_eq!(headers[ODATA_VERSION], "4.0");
        assert_eq!(
            headers[PREFER],
            "odata.include-annotations=\"*\",odata.maxpagesize=25"
        );
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_request_headers_without_page_size() {
        let headers = request_headers(None, "abc").unwrap();
        assert_eq!(headers[PREFER], "odata.include-annotations=\"*\"");
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        assert!(matches!(
            request_headers(None, "abc\ndef"),
            Err(ODataError::InvalidHeaderValue(_))
        ));
    }
}
