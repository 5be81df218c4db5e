use std::path::PathBuf;

pub const ASSETS_DIR_ENV_VAR: &str = "TILEMAP_ASSETS_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub map_path: PathBuf,
    pub tileset_path: PathBuf,
    pub assets_dir: PathBuf,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub target_tps: u32,
    pub snapshot: Option<PathBuf>,
    pub frames: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Help,
    Run(ViewerOptions),
}

pub fn parse_args(args: &[String], env_assets_dir: Option<String>) -> Result<CliCommand, String> {
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        return Ok(CliCommand::Help);
    }

    let mut map_path: Option<PathBuf> = None;
    let mut tileset_path: Option<PathBuf> = None;
    let mut assets_dir: Option<PathBuf> = None;
    let mut scroll_x = 0.0f64;
    let mut scroll_y = 0.0f64;
    let mut target_tps = 60u32;
    let mut snapshot: Option<PathBuf> = None;
    let mut frames = 1u32;

    let mut index = 0usize;
    while index < args.len() {
        let flag = args[index].as_str();
        let value = || {
            args.get(index + 1)
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag {
            "--map" => map_path = Some(PathBuf::from(value()?)),
            "--tileset" => tileset_path = Some(PathBuf::from(value()?)),
            "--assets" => assets_dir = Some(PathBuf::from(value()?)),
            "--scroll-x" => scroll_x = parse_number(flag, value()?, "f64")?,
            "--scroll-y" => scroll_y = parse_number(flag, value()?, "f64")?,
            "--tps" => {
                target_tps = parse_number(flag, value()?, "u32")?;
                if target_tps == 0 {
                    return Err("invalid --tps value '0' (expected at least 1)".to_string());
                }
            }
            "--snapshot" => snapshot = Some(PathBuf::from(value()?)),
            "--frames" => frames = parse_number(flag, value()?, "u32")?,
            other => return Err(format!("unknown argument '{other}'\n\n{}", usage_text())),
        }
        index += 2;
    }

    let map_path = map_path.ok_or_else(|| "missing required --map <path>".to_string())?;
    let tileset_path =
        tileset_path.ok_or_else(|| "missing required --tileset <path>".to_string())?;
    let assets_dir = assets_dir
        .or_else(|| env_assets_dir.filter(|dir| !dir.trim().is_empty()).map(PathBuf::from))
        .or_else(|| tileset_path.parent().map(PathBuf::from))
        .unwrap_or_default();

    Ok(CliCommand::Run(ViewerOptions {
        map_path,
        tileset_path,
        assets_dir,
        scroll_x,
        scroll_y,
        target_tps,
        snapshot,
        frames,
    }))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str, expected: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("invalid {flag} value '{value}' (expected {expected})"))
}

pub fn usage_text() -> String {
    [
        "tilemap-viewer - render a tile map in a window or to a PNG",
        "",
        "Usage:",
        "  tilemap-viewer --map <map.json> --tileset <tileset.json> [options]",
        "",
        "Options:",
        "  --assets <dir>       directory holding the tileset PNGs",
        "  --scroll-x <f64>     horizontal scroll in pixels per tick",
        "  --scroll-y <f64>     vertical scroll in pixels per tick",
        "  --tps <u32>          ticks per second in window mode",
        "  --snapshot <png>     render headlessly and write the last frame",
        "  --frames <u32>       frames to render before the snapshot",
        "",
        "Defaults:",
        "  --assets $TILEMAP_ASSETS_DIR, else the tileset's directory",
        "  --tps 60",
        "  --frames 1",
    ]
    .join("\n")
}
