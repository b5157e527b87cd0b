//! Bot and crawler user-agent signatures.
//!
//! Two lists with different jobs: the narrow set the click path enforces
//! with a 403, and the broad advisory set the split path only records.
//! Ad and social-preview crawlers must be able to follow split links, so
//! that path never blocks.

/// Signals enforced on the outbound-click path.
pub const CLICK_BLOCK_SIGNALS: &[&str] = &[
    "bot",
    "crawl",
    "spider",
    "slurp",
    "facebookexternalhit",
    "mediapartners-google",
    "adsbot",
    "bingpreview",
];

/// Advisory crawler signatures recorded on the split path and used by the
/// bot-flag backfill.
pub const CRAWLER_SIGNATURES: &[&str] = &[
    // Uptime / monitoring
    "UptimeRobot",
    "Pingdom.com_bot_version",
    "PingdomTMS",
    "StatusCake",
    "Uptime/1.0",
    "Better Uptime Bot",
    "GoogleStackdriverMonitoring-UptimeChecks",
    "Datadog/Synthetics",
    "Amazon-Route53-Health-Check-Service",
    "Site24x7",
    "FreshpingBot",
    "HetrixTools",
    // Search engines
    "Googlebot",
    "bingbot",
    "Applebot",
    "YandexBot",
    "Baiduspider",
    "DuckDuckBot",
    "PetalBot",
    "Yahoo! Slurp",
    "Amazonbot",
    // Social previewers
    "facebookexternalhit",
    "Facebot",
    "Twitterbot",
    "LinkedInBot",
    "Pinterestbot",
    "redditbot",
    "Slackbot",
    "Discordbot",
    "TelegramBot",
    "WhatsApp",
    // AI agents
    "GPTBot",
    "ChatGPT-User",
    "ClaudeBot",
    "PerplexityBot",
    "CCBot",
    "Bytespider",
    "Google-Extended",
    "GoogleOther",
    "OAI-SearchBot",
    "Meta-ExternalAgent",
    "YouBot",
    "ImagesiftBot",
    "Omgilibot",
    // SEO crawlers
    "AhrefsBot",
    "SemrushBot",
    "MJ12bot",
    "DotBot",
    "Botify",
    "DeepCrawl",
    "Screaming Frog SEO Spider",
    "Sitebulb",
    "seobilitybot",
    "SEOkicks",
    // Generic libraries and catch-alls
    "bot",
    "crawl",
    "spider",
    "slurp",
    "scan",
    "curl",
    "wget",
    "python-requests",
];

/// Case-insensitive substring scan against a signature list. An empty
/// user-agent never matches; real browsers always send one.
pub fn matches_signatures(user_agent: &str, signatures: &[&str]) -> bool {
    if user_agent.is_empty() {
        return false;
    }
    let ua = user_agent.to_ascii_lowercase();
    signatures
        .iter()
        .any(|sig| ua.contains(&sig.to_ascii_lowercase()))
}
