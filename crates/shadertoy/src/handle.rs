use crate::error::FetchError;

/// Reduces the forms users paste on the command line to a bare shader id.
///
/// Accepts `XsXXDn`, `shadertoy://XsXXDn`, and site URLs such as
/// `https://www.shadertoy.com/view/XsXXDn?foo#bar`.
pub fn normalize_shader_reference(input: &str) -> Result<String, FetchError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidConfig(
            "shader reference must not be empty".into(),
        ));
    }

    if let Some(rest) = trimmed.strip_prefix("shadertoy://") {
        let id = rest.trim().trim_end_matches('/');
        if id.is_empty() {
            return Err(FetchError::InvalidConfig(
                "shadertoy identifier missing after scheme".into(),
            ));
        }
        return Ok(id.to_string());
    }

    if trimmed.contains("shadertoy.com") {
        let without_suffix = trimmed.split(&['?', '#'][..]).next().unwrap_or(trimmed);
        return without_suffix
            .split('/')
            .rev()
            .find(|segment| !segment.is_empty())
            .filter(|segment| !segment.contains("shadertoy.com"))
            .map(str::to_string)
            .ok_or_else(|| {
                FetchError::InvalidConfig("unable to extract shader id from shadertoy url".into())
            });
    }

    if trimmed.contains(char::is_whitespace) || trimmed.contains('/') {
        return Err(FetchError::InvalidConfig(format!(
            "'{trimmed}' does not look like a shader id"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_ids_and_schemes() {
        assert_eq!(normalize_shader_reference(" XsXXDn ").unwrap(), "XsXXDn");
        assert_eq!(
            normalize_shader_reference("shadertoy://4dXGR4").unwrap(),
            "4dXGR4"
        );
    }

    #[test]
    fn extracts_id_from_site_url() {
        assert_eq!(
            normalize_shader_reference("https://www.shadertoy.com/view/XsXXDn?t=1#frag").unwrap(),
            "XsXXDn"
        );
        assert_eq!(
            normalize_shader_reference("www.shadertoy.com/view/Ms2SD1/").unwrap(),
            "Ms2SD1"
        );
    }

    #[test]
    fn rejects_unusable_references() {
        assert!(normalize_shader_reference("   ").is_err());
        assert!(normalize_shader_reference("shadertoy://").is_err());
        assert!(normalize_shader_reference("https://www.shadertoy.com/").is_err());
        assert!(normalize_shader_reference("some/local/path").is_err());
    }
}
