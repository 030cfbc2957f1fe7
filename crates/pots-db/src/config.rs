/// Connection settings for the garden database.
///
/// The CLI decides where the URL comes from (flag, `POTS_DATABASE_URL`,
/// config file, or [`DbConfig::DEFAULT_URL`]).
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    /// Local database used when nothing else names one.
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/pots";

    /// Environment variable that overrides the config file's URL.
    pub const ENV_VAR: &str = "POTS_DATABASE_URL";

    /// Build a config from an explicit URL (CLI flags, config file, tests).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Split the URL into server part, database name and query string.
    ///
    /// `postgresql://u@h:5432/pots?sslmode=require` gives
    /// `("postgresql://u@h:5432", Some("pots"), "?sslmode=require")`.
    fn parts(&self) -> (&str, Option<&str>, &str) {
        let url = self.database_url.as_str();
        let (base, query) = url.find('?').map_or((url, ""), |at| url.split_at(at));
        match base.rsplit_once('/') {
            // Only the scheme's "//" precedes the last slash: no database.
            Some((server, _)) if server.ends_with('/') => (base, None, query),
            Some((server, "")) => (server, None, query),
            Some((server, name)) => (server, Some(name), query),
            None => (base, None, query),
        }
    }

    /// The database name in the URL, if it names one.
    pub fn database_name(&self) -> Option<&str> {
        self.parts().1
    }

    /// Same server and query options, but the `postgres` maintenance
    /// database. `CREATE DATABASE` is issued from there.
    pub fn maintenance_url(&self) -> String {
        let (server, _, query) = self.parts();
        format!("{server}/postgres{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = DbConfig::new(DbConfig::DEFAULT_URL);
        assert_eq!(cfg.database_url, "postgresql://localhost:5432/pots");
        assert_eq!(cfg.database_name(), Some("pots"));
    }

    #[test]
    fn database_name_ignores_query_string() {
        let cfg = DbConfig::new("postgresql://localhost:5432/garden?sslmode=disable");
        assert_eq!(cfg.database_name(), Some("garden"));
    }

    #[test]
    fn database_name_missing() {
        let cfg = DbConfig::new("postgresql://localhost:5432");
        assert_eq!(cfg.database_name(), None);
    }

    #[test]
    fn maintenance_url_replaces_db() {
        let cfg = DbConfig::new("postgresql://localhost:5432/pots");
        assert_eq!(cfg.maintenance_url(), "postgresql://localhost:5432/postgres");
    }

    #[test]
    fn maintenance_url_keeps_options() {
        let cfg = DbConfig::new("postgresql://gardener@db:5432/pots?sslmode=require");
        assert_eq!(
            cfg.maintenance_url(),
            "postgresql://gardener@db:5432/postgres?sslmode=require"
        );

        let bare = DbConfig::new("postgresql://localhost:5432");
        assert_eq!(bare.maintenance_url(), "postgresql://localhost:5432/postgres");
    }
}
