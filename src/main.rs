use clap::{Parser, ValueEnum};
use mobile_actions::testing::{ScriptedElement, ScriptedSession};
use mobile_actions::{InteractionEngine, Locator, Platform};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Android,
    Ios,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Android => Platform::Android,
            PlatformArg::Ios => Platform::Ios,
        }
    }
}

/// Walks the interaction engine through a scripted screen, so the
/// library can be exercised without a device attached.
#[derive(Parser)]
#[command(name = "mobile-actions", about = "Scripted demo of the interaction engine")]
struct Args {
    /// Platform whose scroll-container defaults to simulate
    #[arg(long, value_enum, default_value = "android")]
    platform: PlatformArg,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let platform = Platform::from(args.platform);
    info!("starting scripted interaction demo on {platform}");

    let session = ScriptedSession::builder(platform)
        .viewport(1080, 1920)
        .element(ScriptedElement::new("login_button"))
        .element(ScriptedElement::new("notifications_row").visible_after_swipes(2))
        .element(ScriptedElement::new("wifi_switch").checked(false))
        .build();
    let probe = session.clone();
    let engine = InteractionEngine::new(session);

    engine.click(&Locator::id("login_button"), None).await?;
    info!("tapped the login button");

    let found = engine
        .scroll_to_element(&Locator::id("notifications_row"), None, None, None)
        .await?;
    info!(
        found,
        swipes = probe.swipe_count(),
        "scrolled looking for the notifications row"
    );

    let coerced = engine
        .set_toggle_state(&Locator::id("wifi_switch"), true)
        .await;
    info!(
        coerced,
        clicks = probe.click_count("wifi_switch"),
        "drove the wifi switch on"
    );

    engine.tap_at_ratio(0.5, 0.9).await?;
    info!(taps = ?probe.taps(), "tapped the bottom of the screen");

    Ok(())
}
