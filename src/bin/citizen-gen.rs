use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use citizen_gen::{
    AnchorPolicy, Dimensions, FetchedLayer, LayerKind, LayerRole, OverlayAssets, Renderer,
    RenderFlags, Size, cache::DiskCache, chain::RpcTokenSource, codec, config::ServiceConfig,
    fetch::HttpFetcher, parse_background_color, parts::SvgRasterizer, server, service,
};

#[derive(Parser, Debug)]
#[command(name = "citizen-gen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Composite local layer files into one PNG.
    Compose(ComposeArgs),
    /// Nearest-neighbour resize of a local image.
    Upscale(UpscaleArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Bind address (overrides HOST).
    #[arg(long)]
    host: Option<String>,

    /// Overlay asset directory (overrides ASSETS_DIR).
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Render cache directory (overrides CACHE_DIR).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Use the historical single-column head scan.
    #[arg(long)]
    legacy_anchor: bool,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Layer, bottom first: `kind=path` or `kind:role=path`. Kinds: body,
    /// cloth, hand, weapon, hair, helmet, other. Roles: background, trait.
    /// `background=path` is shorthand for `other:background=path`; at most
    /// one layer may carry the background role.
    #[arg(long = "layer", required = true)]
    layers: Vec<String>,

    /// `WxH` or `pfp`.
    #[arg(long, default_value = "1200x1200")]
    size: String,

    #[arg(long)]
    no_bg: bool,

    #[arg(long)]
    santa_hat: bool,

    #[arg(long)]
    snowball: bool,

    #[arg(long)]
    no_clothes: bool,

    #[arg(long)]
    crop_preview: bool,

    /// Background colour: six hex digits or an alias (elite, default, outer).
    #[arg(long)]
    bg_color: Option<String>,

    /// Overlay asset directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    #[arg(long)]
    legacy_anchor: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct UpscaleArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target size, `WxH`.
    #[arg(long)]
    size: String,

    #[arg(long)]
    out: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    // `.env` may carry RUST_LOG, so it is applied before the subscriber.
    let dotenv = citizen_gen::config::load_dotenv();
    init_tracing();
    match dotenv {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }
    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Upscale(args) => cmd_upscale(args),
    }
}

fn anchor_policy(legacy: bool) -> AnchorPolicy {
    if legacy {
        AnchorPolicy::Legacy
    } else {
        AnchorPolicy::Refined
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut cfg = ServiceConfig::from_env().context("load service configuration")?;
    if let Some(host) = args.host {
        cfg.host = host;
    }
    if let Some(dir) = args.assets {
        cfg.assets_dir = dir;
    }
    if let Some(dir) = args.cache_dir {
        cfg.cache_dir = dir;
    }

    let overlays = Arc::new(OverlayAssets::load(&cfg.assets_dir));
    let renderer = Renderer::new(overlays).with_policy(anchor_policy(args.legacy_anchor));
    let http = reqwest::Client::builder()
        .user_agent(concat!("citizen-gen/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build http client")?;
    let svc = service::CitizenService::new(
        renderer,
        Arc::new(RpcTokenSource::with_client(http.clone(), cfg.rpc.clone())),
        Arc::new(HttpFetcher::new(http)),
        cfg.contracts.clone(),
        DiskCache::new(&cfg.cache_dir),
        SvgRasterizer::with_fonts(Some(&cfg.assets_dir.join("fonts"))),
    );

    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    rt.block_on(server::serve(server::AppState::new(svc), &cfg.host))
}

fn parse_layer_arg(arg: &str) -> anyhow::Result<(LayerKind, LayerRole, PathBuf)> {
    let (tag, path) = arg
        .split_once('=')
        .with_context(|| format!("layer '{arg}' is not kind=path"))?;
    let (kind, role) = match tag.split_once(':') {
        Some((k, r)) => (k, Some(r)),
        None => (tag, None),
    };

    let (kind, default_role) = match kind.to_ascii_lowercase().as_str() {
        "background" | "bg" => (LayerKind::Other, LayerRole::Background),
        "body" => (LayerKind::Body, LayerRole::Trait),
        "cloth" | "clothing" => (LayerKind::Cloth, LayerRole::Trait),
        "hand" => (LayerKind::Hand, LayerRole::Trait),
        "weapon" => (LayerKind::Weapon, LayerRole::Trait),
        "hair" => (LayerKind::Hair, LayerRole::Trait),
        "helmet" | "helm" => (LayerKind::Helmet, LayerRole::Trait),
        "other" => (LayerKind::Other, LayerRole::Trait),
        other => anyhow::bail!("unknown layer kind '{other}'"),
    };
    let role = match role.map(str::to_ascii_lowercase).as_deref() {
        None => default_role,
        Some("background") => LayerRole::Background,
        Some("trait") => LayerRole::Trait,
        Some(other) => anyhow::bail!("unknown layer role '{other}'"),
    };
    Ok((kind, role, PathBuf::from(path)))
}

fn load_layer(kind: LayerKind, role: LayerRole, path: &Path) -> anyhow::Result<FetchedLayer> {
    let bytes = std::fs::read(path).with_context(|| format!("read layer '{}'", path.display()))?;
    let image = codec::decode_raster(&bytes, codec::DEFAULT_MAX_PIXELS)
        .with_context(|| format!("decode layer '{}'", path.display()))?;
    Ok(FetchedLayer::new(image, path.display().to_string(), kind).with_role(role))
}

fn write_png(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let dimensions: Dimensions = args.size.parse()?;
    let background_override = args
        .bg_color
        .as_deref()
        .filter(|_| !args.crop_preview)
        .map(parse_background_color)
        .transpose()?;

    let flags = RenderFlags {
        no_background: args.no_bg,
        add_hat_overlay: args.santa_hat,
        snowball_mode: args.snowball,
        no_clothes: args.no_clothes,
        portrait_mode: dimensions == Dimensions::Portrait,
        preview_mode: args.crop_preview,
        female_variant: false,
        background_override,
        size: dimensions.size(),
    };

    let layers = args
        .layers
        .iter()
        .map(|arg| {
            let (kind, role, path) = parse_layer_arg(arg)?;
            load_layer(kind, role, &path)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let backgrounds = layers.iter().filter(|l| l.is_background()).count();
    if backgrounds > 1 {
        anyhow::bail!("{backgrounds} layers have the background role; at most one may");
    }

    let overlays = match &args.assets {
        Some(dir) => OverlayAssets::load(dir),
        None => OverlayAssets::empty(),
    };
    let renderer = Renderer::new(Arc::new(overlays)).with_policy(anchor_policy(args.legacy_anchor));
    let img = renderer.render(&layers, &flags)?;
    write_png(&args.out, &codec::encode_png(&img)?)
}

fn cmd_upscale(args: UpscaleArgs) -> anyhow::Result<()> {
    let size: Size = args.size.parse()?;
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read '{}'", args.in_path.display()))?;
    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let png = rt.block_on(service::upscale(bytes, size))?;
    write_png(&args.out, &png)
}
