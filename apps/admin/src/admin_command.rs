use rolegate_core::AppError;

const USAGE: &str = concat!(
    "usage: rolegate-admin <migrate | permissions | roles | ",
    "check <kind> <id> <permission> <actions> [team]>"
);

/// Principal named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalArgs {
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Migrate,
    Permissions,
    Roles,
    Check {
        principal: PrincipalArgs,
        permission: String,
        actions: Vec<String>,
        team_id: Option<String>,
    },
}

impl AdminCommand {
    /// Parses arguments following the program name.
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let args = args.into_iter().collect::<Vec<_>>();
        let arguments = args.iter().map(String::as_str).collect::<Vec<_>>();

        match arguments.as_slice() {
            ["migrate"] => Ok(Self::Migrate),
            ["permissions"] => Ok(Self::Permissions),
            ["roles"] => Ok(Self::Roles),
            ["check", kind, id, permission, actions, rest @ ..] if rest.len() <= 1 => {
                Ok(Self::Check {
                    principal: PrincipalArgs {
                        kind: (*kind).to_owned(),
                        id: (*id).to_owned(),
                    },
                    permission: (*permission).to_owned(),
                    actions: split_actions(actions),
                    team_id: rest.first().map(|team| (*team).to_owned()),
                })
            }
            _ => Err(AppError::Validation(USAGE.to_owned())),
        }
    }
}

fn split_actions(actions: &str) -> Vec<String> {
    actions
        .split(',')
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use rolegate_core::AppError;

    use super::{AdminCommand, PrincipalArgs};

    fn parse(args: &[&str]) -> Result<AdminCommand, AppError> {
        AdminCommand::parse(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_listing_commands() {
        assert!(matches!(parse(&["migrate"]), Ok(AdminCommand::Migrate)));
        assert!(matches!(parse(&["roles"]), Ok(AdminCommand::Roles)));
        assert!(matches!(
            parse(&["permissions"]),
            Ok(AdminCommand::Permissions)
        ));
    }

    #[test]
    fn parses_team_scoped_check() {
        let command = parse(&["check", "user", "7", "user", "read, delete", "T1"])
            .unwrap_or_else(|error| panic!("{error}"));

        assert_eq!(
            command,
            AdminCommand::Check {
                principal: PrincipalArgs {
                    kind: "user".to_owned(),
                    id: "7".to_owned(),
                },
                permission: "user".to_owned(),
                actions: vec!["read".to_owned(), "delete".to_owned()],
                team_id: Some("T1".to_owned()),
            }
        );
    }

    #[test]
    fn rejects_unknown_or_incomplete_commands() {
        assert!(matches!(parse(&[]), Err(AppError::Validation(_))));
        assert!(matches!(parse(&["serve"]), Err(AppError::Validation(_))));
        assert!(matches!(
            parse(&["check", "user", "7", "blog"]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse(&["check", "user", "7", "blog", "read", "T1", "extra"]),
            Err(AppError::Validation(_))
        ));
    }
}
