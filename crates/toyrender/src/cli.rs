use clap::Parser;
use shadertoy::DEFAULT_API_KEY;

#[derive(Parser, Debug)]
#[command(
    name = "toyrender",
    author,
    version,
    about = "Fetch a Shadertoy shader and render it in a window"
)]
pub struct Cli {
    /// Shader id, `https://www.shadertoy.com/view/<id>` URL, or `shadertoy://<id>`.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Timer rate in frames per second.
    #[arg(long, value_name = "FPS", default_value_t = 30, value_parser = parse_rate)]
    pub rate: u32,

    /// Stop after this many seconds of shader time.
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration)]
    pub duration: Option<f64>,

    /// Window size in pixels.
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        default_value = "1280x720",
        value_parser = parse_surface_size
    )]
    pub size: (u32, u32),

    /// Shadertoy API key; can also be supplied via the `SHADERTOY_API_KEY` env var.
    #[arg(long, env = "SHADERTOY_API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    pub api_key: String,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_rate(value: &str) -> Result<u32, String> {
    let rate: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid rate '{value}'; expected a whole number of frames per second"))?;
    if rate == 0 {
        return Err("rate must be greater than zero".to_string());
    }
    Ok(rate)
}

pub fn parse_duration(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration '{value}'; expected seconds"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err("duration must be a positive number of seconds".to_string());
    }
    Ok(seconds)
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1920x1080").unwrap(), (1920, 1080));
        assert_eq!(parse_surface_size(" 640 X 480 ").unwrap(), (640, 480));
        assert!(parse_surface_size("1920").is_err());
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
    }

    #[test]
    fn rate_must_be_positive() {
        assert_eq!(parse_rate("60").unwrap(), 60);
        assert!(parse_rate("0").is_err());
        assert!(parse_rate("-5").is_err());
        assert!(parse_rate("2.5").is_err());
    }

    #[test]
    fn duration_must_be_positive() {
        assert_eq!(parse_duration("2.5").unwrap(), 2.5);
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("NaN").is_err());
    }

    #[test]
    fn defaults_apply() {
        let cli = Cli::try_parse_from(["toyrender", "XsXXDn"]).unwrap();
        assert_eq!(cli.id, "XsXXDn");
        assert_eq!(cli.rate, 30);
        assert_eq!(cli.duration, None);
        assert_eq!(cli.size, (1280, 720));
    }

    #[test]
    fn accepts_all_flags() {
        let cli = Cli::try_parse_from([
            "toyrender",
            "shadertoy://4dXGR4",
            "--rate",
            "60",
            "--duration",
            "2",
            "--size",
            "800x600",
            "--api-key",
            "abc",
        ])
        .unwrap();
        assert_eq!(cli.rate, 60);
        assert_eq!(cli.duration, Some(2.0));
        assert_eq!(cli.size, (800, 600));
        assert_eq!(cli.api_key, "abc");
    }

    #[test]
    fn id_is_required() {
        assert!(Cli::try_parse_from(["toyrender"]).is_err());
    }
}
