//! Run handler: one execution request from a file or piped stdin.

use std::io::{self, Read};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use is_terminal::IsTerminal;

use crate::{
    catalog::{self, Catalog},
    config::Settings,
    orchestrator::Orchestrator,
    piston::PistonClient,
    printer,
    state::Selection,
};

pub struct RunOptions<'a> {
    pub file: Option<&'a Path>,
    pub language: Option<&'a str>,
    pub version: Option<&'a str>,
    pub stdin: Option<String>,
    pub args: Vec<String>,
    pub color: bool,
}

/// Returns the program's exit code when the service reported one.
pub async fn run(settings: &Settings, opts: RunOptions<'_>) -> Result<Option<i32>> {
    let source = read_source(opts.file)?;
    let client = PistonClient::from_settings(settings)?;

    let selection = match (opts.language, opts.version) {
        (Some(language), Some(version)) => Selection {
            language: language.to_string(),
            version: version.to_string(),
        },
        (None, Some(version)) => Selection {
            language: settings.default_language.clone(),
            version: version.to_string(),
        },
        (Some(language), None) if language == settings.default_language => Selection {
            language: language.to_string(),
            version: settings.default_version.clone(),
        },
        (Some(language), None) => {
            let catalog = catalog::load(&client)
                .await
                .context("no --version given and the runtime catalog could not be fetched")?;
            latest_for(&catalog, language).ok_or_else(|| {
                anyhow!("no runtime named '{}'; see `codepad runtimes`", language)
            })?
        }
        (None, None) => Selection {
            language: settings.default_language.clone(),
            version: settings.default_version.clone(),
        },
    };

    let mut request = Orchestrator::prepare(&source, &selection);
    request.stdin = opts.stdin;
    request.args = opts.args;

    tracing::info!(language = %selection.language, version = %selection.version, "running");
    let orchestrator = Orchestrator::new(client);
    let result = orchestrator
        .execute(&request)
        .await
        .context("execution request failed")?;

    printer::print_run_result(&result, opts.color);
    Ok(result.code)
}

fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => {
            if io::stdin().is_terminal() {
                bail!("provide a source FILE or pipe code on stdin");
            }
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Resolve a language name or alias to the version listed first for it.
fn latest_for(catalog: &Catalog, language: &str) -> Option<Selection> {
    catalog.find_language(language).map(|o| Selection {
        language: o.language.clone(),
        version: o.version.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piston::Runtime;
    use std::io::Write;

    #[test]
    fn alias_resolves_to_canonical_language() {
        let catalog = Catalog::from_runtimes(vec![Runtime {
            language: "python".into(),
            version: "3.10.0".into(),
            aliases: vec!["py".into()],
        }]);
        assert_eq!(
            latest_for(&catalog, "py"),
            Some(Selection { language: "python".into(), version: "3.10.0".into() })
        );
        assert_eq!(latest_for(&catalog, "ruby"), None);
    }

    #[test]
    fn source_is_read_verbatim_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"print('hi')\n\n").unwrap();
        assert_eq!(read_source(Some(file.path())).unwrap(), "print('hi')\n\n");
    }

    #[tokio::test]
    async fn service_failure_is_reported_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/execute")
            .with_status(500)
            .with_body(r#"{"message":"sandbox crashed"}"#)
            .create_async()
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"console.log(1)").unwrap();
        let settings = Settings { api_base: server.url(), ..Settings::default() };
        let err = run(
            &settings,
            RunOptions {
                file: Some(file.path()),
                language: None,
                version: None,
                stdin: None,
                args: Vec::new(),
                color: false,
            },
        )
        .await
        .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.to_string(), "execution request failed");
        let chain = format!("{:#}", err);
        assert!(chain.contains("status code 500: sandbox crashed"));
        assert!(!chain.contains("Error: "));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_source(Some(Path::new("/nonexistent/main.py"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/main.py"));
    }
}
