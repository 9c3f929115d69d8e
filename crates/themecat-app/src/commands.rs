//! Command-line parsing and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use themecat_skin::ThemeService;

pub const USAGE: &str = "\
usage: themecat [--config PATH] <command>

commands:
  show                      applied theme, skin, and wallet
  themes                    themes in the catalog
  skins                     skins of the applied theme
  set-theme <id>            apply theme <id>
  set-skin <skin-id> <wallet>
                            map <wallet> to skin <skin-id>
  wallet <wallet>           activate <wallet> with its mapped skin
  discover-themes           list compatible themes on the theme server
  import-theme <index>      import discovered theme <index>
  discover-skins            list compatible skins for the applied theme
  import-skin <index>       import discovered skin <index>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Themes,
    Skins,
    SetTheme(usize),
    SetSkin { skin_id: usize, wallet: String },
    Wallet(String),
    DiscoverThemes,
    ImportTheme(usize),
    DiscoverSkins,
    ImportSkin(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config: Option<PathBuf>,
    pub command: Command,
}

/// Parse the arguments after the program name.
pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config = None;
    let mut words = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            },
            "-h" | "--help" => bail!("{USAGE}"),
            _ => words.push(arg),
        }
    }

    let Some((name, rest)) = words.split_first() else {
        bail!("missing command\n\n{USAGE}");
    };
    let command = match (name.as_str(), rest) {
        ("show", []) => Command::Show,
        ("themes", []) => Command::Themes,
        ("skins", []) => Command::Skins,
        ("set-theme", [id]) => Command::SetTheme(parse_index(id)?),
        ("set-skin", [id, wallet]) => Command::SetSkin {
            skin_id: parse_index(id)?,
            wallet: wallet.clone(),
        },
        ("wallet", [wallet]) => Command::Wallet(wallet.clone()),
        ("discover-themes", []) => Command::DiscoverThemes,
        ("import-theme", [index]) => Command::ImportTheme(parse_index(index)?),
        ("discover-skins", []) => Command::DiscoverSkins,
        ("import-skin", [index]) => Command::ImportSkin(parse_index(index)?),
        _ => bail!("unrecognized command: {}\n\n{USAGE}", words.join(" ")),
    };
    Ok(Invocation { config, command })
}

fn parse_index(s: &str) -> Result<usize> {
    s.parse()
        .with_context(|| format!("expected a non-negative number, got '{s}'"))
}

/// Run `command` against an initialized service. Returns the lines to print.
///
/// Discovery snapshots do not outlive the process, so the import commands
/// discover first and then import from the fresh snapshot.
pub fn run(command: &Command, service: &mut ThemeService) -> Result<Vec<String>> {
    let mut out = Vec::new();
    match command {
        Command::Show => {
            let state = service.published().context("nothing published")?;
            out.push(format!(
                "theme: {} (id {})",
                state.theme().header.name,
                state.theme_id()
            ));
            out.push(format!(
                "skin: {} (id {})",
                state.skin().header.name,
                state.skin_id()
            ));
            let wallet = match state.wallet_id() {
                "" => "-",
                w => w,
            };
            out.push(format!("wallet: {wallet}"));
            out.push(format!("service: {}", service.catalog().service.url));
        },
        Command::Themes => {
            let current = service.catalog_theme_id();
            for (i, theme) in service.catalog_themes().iter().enumerate() {
                let marker = if i == current { '*' } else { ' ' };
                out.push(format!(
                    "{marker}{i}: {} (schema {}, {} skins, default {})",
                    theme.header.name,
                    theme.header.schema_version,
                    theme.skins.len(),
                    theme.header.default_skin_id
                ));
            }
        },
        Command::Skins => {
            let state = service.published().context("nothing published")?;
            for (i, skin) in state.skins().iter().enumerate() {
                let marker = if i == state.skin_id() { '*' } else { ' ' };
                out.push(format!("{marker}{i}: {}", skin.header.name));
            }
        },
        Command::SetTheme(id) => {
            let state = service.set_theme(*id)?;
            out.push(format!("Theme set to '{}'", state.theme().header.name));
        },
        Command::SetSkin { skin_id, wallet } => {
            let state = service.set_skin_for_wallet(*skin_id, wallet)?;
            out.push(format!(
                "Skin '{}' applied to wallet '{wallet}'",
                state.skin().header.name
            ));
        },
        Command::Wallet(wallet) => {
            let state = service.update_skin(wallet)?;
            out.push(format!(
                "Wallet '{wallet}' uses skin '{}'",
                state.skin().header.name
            ));
        },
        Command::DiscoverThemes => {
            let found = service.discover_themes();
            if found.is_empty() {
                out.push("No compatible themes found.".to_string());
            }
            for (i, header) in found.iter().enumerate() {
                out.push(format!("{i}: {} (schema {})", header.name, header.schema_version));
            }
        },
        Command::ImportTheme(index) => {
            service.discover_themes();
            match service.import_theme(*index)? {
                Some(theme) => out.push(format!("Imported theme '{}'", theme.header.name)),
                None => out.push("Theme import failed; catalog unchanged.".to_string()),
            }
        },
        Command::DiscoverSkins => {
            let theme = published_theme_name(service)?;
            let found = service.discover_skins(&theme);
            if found.is_empty() {
                out.push(format!("No compatible skins found for '{theme}'."));
            }
            for (i, header) in found.iter().enumerate() {
                out.push(format!("{i}: {} (schema {})", header.name, header.schema_version));
            }
        },
        Command::ImportSkin(index) => {
            let theme = published_theme_name(service)?;
            service.discover_skins(&theme);
            match service.import_skin(*index)? {
                Some(skin) => out.push(format!(
                    "Imported skin '{}' into '{theme}'",
                    skin.header.name
                )),
                None => out.push("Skin import failed; catalog unchanged.".to_string()),
            }
        },
    }
    Ok(out)
}

fn published_theme_name(service: &ThemeService) -> Result<String> {
    let state = service.published().context("nothing published")?;
    Ok(state.theme().header.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use themecat_net::RemoteTransport;
    use themecat_skin::{BootstrapDefinition, Catalog, MemoryCatalogStore, ServiceEndpoint, VfsBundle};
    use themecat_types::error::{CatalogError, Result as CatalogResult};
    use themecat_vfs::MemoryVfs;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    /// Serves one theme listing and one theme; everything else is a 404.
    struct StubServer;

    impl RemoteTransport for StubServer {
        fn get_json(&self, url: &str) -> CatalogResult<Value> {
            match url {
                "http://stub/themes" => Ok(json!({ "data": [
                    { "name": "night", "schemaVersion": 1 },
                    { "name": "future", "schemaVersion": 7 },
                ]})),
                "http://stub/themes/night" => Ok(json!({
                    "header": { "name": "night", "schemaVersion": 1, "defaultSkinId": 0 },
                    "skins": [{ "header": { "name": "moon", "schemaVersion": 1 }, "view": {} }],
                    "view": {}
                })),
                _ => Err(CatalogError::transport(url, "HTTP status 404")),
            }
        }
    }

    fn service() -> ThemeService {
        let vfs = MemoryVfs::new()
            .with_file(
                "/themes/default/theme.json",
                r#"{"header":{"name":"default","schemaVersion":1,"defaultSkinName":"dark"},"view":{}}"#,
            )
            .unwrap()
            .with_file(
                "/themes/default/skins/light/skin.json",
                r#"{"header":{"name":"light","schemaVersion":1},"view":{}}"#,
            )
            .unwrap()
            .with_file(
                "/themes/default/skins/dark/skin.json",
                r#"{"header":{"name":"dark","schemaVersion":1},"view":{}}"#,
            )
            .unwrap();
        let store = MemoryCatalogStore::new(Catalog {
            service: ServiceEndpoint {
                url: "http://stub".into(),
            },
            ..Catalog::default()
        });
        let mut service = ThemeService::new(store, VfsBundle::new(vfs, "file:///app"), StubServer);
        service
            .init(&BootstrapDefinition {
                theme: "default".into(),
                skins: vec!["light".into(), "dark".into()],
            })
            .unwrap();
        service
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_args(args("show")).unwrap().command, Command::Show);
        assert_eq!(parse_args(args("set-theme 2")).unwrap().command, Command::SetTheme(2));
        assert_eq!(
            parse_args(args("set-skin 1 wallet-a")).unwrap().command,
            Command::SetSkin {
                skin_id: 1,
                wallet: "wallet-a".into()
            }
        );
        assert_eq!(parse_args(args("import-skin 0")).unwrap().command, Command::ImportSkin(0));
    }

    #[test]
    fn config_flag_anywhere() {
        let inv = parse_args(args("themes --config /etc/themecat.toml")).unwrap();
        assert_eq!(inv.command, Command::Themes);
        assert_eq!(inv.config, Some(PathBuf::from("/etc/themecat.toml")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(args("")).is_err());
        assert!(parse_args(args("set-theme")).is_err());
        assert!(parse_args(args("set-theme -1")).is_err());
        assert!(parse_args(args("show extra")).is_err());
        assert!(parse_args(args("frobnicate")).is_err());
        assert!(parse_args(args("show --config")).is_err());
    }

    #[test]
    fn show_and_listings() {
        let mut svc = service();
        assert_eq!(run(&Command::Show, &mut svc).unwrap(), vec![
            "theme: default (id 0)",
            "skin: dark (id 1)",
            "wallet: -",
            "service: http://stub",
        ]);
        assert_eq!(run(&Command::Skins, &mut svc).unwrap(), vec![" 0: light", "*1: dark"]);
        assert_eq!(run(&Command::Themes, &mut svc).unwrap(), vec![
            "*0: default (schema 1, 2 skins, default 1)"
        ]);
    }

    #[test]
    fn wallet_and_skin_selection() {
        let mut svc = service();
        let out = run(
            &Command::SetSkin {
                skin_id: 0,
                wallet: "w1".into(),
            },
            &mut svc,
        )
        .unwrap();
        assert_eq!(out, vec!["Skin 'light' applied to wallet 'w1'"]);

        let out = run(&Command::Wallet("w2".into()), &mut svc).unwrap();
        assert_eq!(out, vec!["Wallet 'w2' uses skin 'dark'"]);
        assert!(run(&Command::SetTheme(5), &mut svc).is_err());
    }

    #[test]
    fn discover_and_import_theme() {
        let mut svc = service();
        assert_eq!(run(&Command::DiscoverThemes, &mut svc).unwrap(), vec![
            "0: night (schema 1)"
        ]);
        assert_eq!(run(&Command::ImportTheme(0), &mut svc).unwrap(), vec![
            "Imported theme 'night'"
        ]);
        assert_eq!(run(&Command::SetTheme(1), &mut svc).unwrap(), vec![
            "Theme set to 'night'"
        ]);
    }

    #[test]
    fn skin_discovery_failure_is_reported() {
        let mut svc = service();
        assert_eq!(run(&Command::DiscoverSkins, &mut svc).unwrap(), vec![
            "No compatible skins found for 'default'."
        ]);
        assert!(run(&Command::ImportSkin(0), &mut svc).is_err());
    }
}
