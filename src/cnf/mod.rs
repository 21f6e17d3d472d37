/// The publicly visible name of the tool
pub const PKG_NAME: &str = "hasura-auto-tracker";

/// The configuration file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "hasura-auto-tracker.json";

/// The Postgres schema tracked when none is configured
pub const DEFAULT_TARGET_SCHEMA: &str = "public";

/// The suffix stripped from foreign key columns when naming relationships
pub const DEFAULT_PRIMARY_KEY_SUFFIX: &str = "_id";

/// The header carrying the Hasura admin secret
pub const ADMIN_SECRET_HEADER: &str = "X-Hasura-Admin-Secret";

/// Environment variable read for the metadata endpoint
pub const ENDPOINT_ENV: &str = "HASURA_GRAPHQL_ENDPOINT";

/// Environment variable read for the admin secret
pub const ADMIN_SECRET_ENV: &str = "HASURA_GRAPHQL_ADMIN_SECRET";

/// The version of this build
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
