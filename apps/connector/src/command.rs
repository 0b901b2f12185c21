use clap::{Args, Parser, Subcommand};
use tessera_application::MembershipChange;

#[derive(Debug, Parser)]
#[command(
    name = "tessera-connector",
    about = "Syncs Elastic cloud and deployment access into a resource graph"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Runs a full sync when no subcommand is given.
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Sync)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Check the configured credentials
    Validate,
    /// Walk every resource type and print the graph as JSON
    Sync,
    /// Grant an entitlement to a deployment user
    Grant(MembershipArgs),
    /// Revoke an entitlement from a deployment user
    Revoke(MembershipArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct MembershipArgs {
    /// Resource type id of the entitlement holder (role, roleMapping)
    pub resource_type: String,
    /// Resource key of the entitlement holder
    pub resource_id: String,
    /// Entitlement slug on the holder
    pub entitlement_slug: String,
    /// Deployment username receiving or losing the membership
    pub principal_username: String,
}

impl From<MembershipArgs> for MembershipChange {
    fn from(args: MembershipArgs) -> Self {
        Self {
            resource_type: args.resource_type,
            resource_id: args.resource_id,
            entitlement_slug: args.entitlement_slug,
            principal_username: args.principal_username,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tessera_application::MembershipChange;

    use super::{Cli, Command};

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("tessera-connector").chain(args.iter().copied()))
            .map(Cli::command)
    }

    #[test]
    fn sync_is_the_default_command() {
        assert!(matches!(parse(&[]), Ok(Command::Sync)));
        assert!(matches!(parse(&["sync"]), Ok(Command::Sync)));
        assert!(matches!(parse(&["validate"]), Ok(Command::Validate)));
    }

    #[test]
    fn grant_takes_four_arguments() {
        let Ok(Command::Grant(args)) = parse(&["grant", "roleMapping", "m7", "admin", "alice"])
        else {
            panic!("grant arguments should parse");
        };

        let change = MembershipChange::from(args);
        assert_eq!(change.resource_type, "roleMapping");
        assert_eq!(change.resource_id, "m7");
        assert_eq!(change.entitlement_slug, "admin");
        assert_eq!(change.principal_username, "alice");
    }

    #[test]
    fn malformed_commands_are_rejected() {
        assert!(parse(&["revoke", "role", "admin"]).is_err());
        assert!(parse(&["grant", "role", "admin", "member", "alice", "bob"]).is_err());
        assert!(parse(&["purge"]).is_err());
        assert!(parse(&["sync", "now"]).is_err());
    }
}
