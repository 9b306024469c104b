/// Filter value meaning "no restriction on this dimension"
pub const ALL: &str = "all";

/// Promotional lists an entry can be featured in
pub const FEATURED_LABELS: [&str; 3] = ["Top Trending", "Latest", "Hot"];

/// Card image used when an entry has no `imageUrl`
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400.png";

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can manage catalog entries and banners
pub const ROLE_ADMIN: &str = "admin";
