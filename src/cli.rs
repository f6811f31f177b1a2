//! Command-line interface.

use clap::{Arg, ArgMatches, Command};

/// Parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run the HTTP server.
    Serve { config: String },
    /// Create the first administrator and exit.
    CreateAdmin {
        config: String,
        email: String,
        password: String,
        name: String,
    },
}

pub fn new() -> Command {
    Command::new("academy")
        .about("Coaching academy portal backend")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to the TOML configuration file")
                .default_value("config.toml")
                .env("ACADEMY_CONFIG")
                .global(true),
        )
        .subcommand(
            Command::new("create-admin")
                .about("Create the first administrator")
                .arg(
                    Arg::new("email")
                        .long("email")
                        .help("Administrator email")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Administrator password")
                        .env("ACADEMY_ADMIN_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Display name")
                        .default_value("Admin"),
                ),
        )
}

fn value(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

/// Map parsed arguments to an action.
pub fn dispatch(matches: &ArgMatches) -> Action {
    let config = value(matches, "config");

    match matches.subcommand() {
        Some(("create-admin", sub)) => Action::CreateAdmin {
            config,
            email: value(sub, "email"),
            password: value(sub, "password"),
            name: value(sub, "name"),
        },
        _ => Action::Serve { config },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Action {
        dispatch(&new().try_get_matches_from(args).unwrap())
    }

    #[test]
    fn test_serve_default_config() {
        assert_eq!(
            parse(&["academy"]),
            Action::Serve {
                config: "config.toml".to_string()
            }
        );
    }

    #[test]
    fn test_create_admin() {
        let action = parse(&[
            "academy",
            "create-admin",
            "--email",
            "a@x.com",
            "--password",
            "pw1234",
            "--config",
            "/etc/academy.toml",
        ]);

        assert_eq!(
            action,
            Action::CreateAdmin {
                config: "/etc/academy.toml".to_string(),
                email: "a@x.com".to_string(),
                password: "pw1234".to_string(),
                name: "Admin".to_string(),
            }
        );
    }

    #[test]
    fn test_create_admin_requires_email() {
        assert!(new()
            .try_get_matches_from(["academy", "create-admin", "--password", "pw1234"])
            .is_err());
    }

    #[test]
    fn test_command_is_consistent() {
        new().debug_assert();
    }
}
