//! Scripted `OpsClient` fixtures shared by the unit tests.

use crate::azure::client::OpsClient;
use crate::azure::runner::{MockProcessExecutor, ProcessOutput};
use crate::azure::tenant_region::FixedRegion;
use crate::config::Config;
use std::sync::{Arc, Mutex};

pub(crate) type Calls = Arc<Mutex<Vec<Vec<String>>>>;

pub(crate) struct Fixture {
    // Keeps the temp dir alive for the client's paths.
    _dir: tempfile::TempDir,
    pub client: OpsClient,
    pub calls: Calls,
}

pub(crate) fn ok(stdout: &str) -> ProcessOutput {
    ProcessOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

pub(crate) fn failed(stderr: &str) -> ProcessOutput {
    ProcessOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(1),
    }
}

/// True when `args` invoke the named script.
pub(crate) fn invokes(args: &[String], script: &str) -> bool {
    args.iter().any(|a| a.ends_with(script))
}

/// Builds a client over a temp dir holding the given templates (paths
/// relative to the templates dir) and empty script files. Every command is
/// recorded and answered by `respond(program, args)`.
pub(crate) fn fixture<F>(
    templates: &[(&str, &str)],
    scripts: &[&str],
    region: Option<&str>,
    respond: F,
) -> Fixture
where
    F: Fn(&str, &[String]) -> ProcessOutput + Send + Sync + 'static,
{
    let dir = tempfile::tempdir().unwrap();
    for (relative, source) in templates {
        let path = dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, source).unwrap();
    }
    let scripts_dir = dir.path().join("scripts");
    std::fs::create_dir_all(&scripts_dir).unwrap();
    for script in scripts {
        std::fs::write(scripts_dir.join(script), "").unwrap();
    }

    let calls: Calls = Arc::default();
    let recorded = calls.clone();
    let mut executor = MockProcessExecutor::new();
    executor.expect_execute().returning(move |program, args, _| {
        let mut line = vec![program.to_string()];
        line.extend(args.iter().cloned());
        recorded.lock().unwrap().push(line);
        Ok(respond(program, args))
    });

    let config = Config {
        scripts_dir,
        templates_dir: dir.path().to_path_buf(),
        instructions_file: dir.path().join("AGENT_INSTRUCTIONS.md"),
        ..Config::default()
    };
    let client = OpsClient::new(
        config,
        Arc::new(executor),
        "pwsh",
        Arc::new(FixedRegion(region.map(str::to_string))),
    );
    Fixture {
        _dir: dir,
        client,
        calls,
    }
}

impl Fixture {
    pub fn calls_to(&self, script: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| invokes(c, script))
            .cloned()
            .collect()
    }

    pub fn all_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

/// Value following `flag` in a recorded command line.
pub(crate) fn arg<'a>(call: &'a [String], flag: &str) -> Option<&'a str> {
    let pos = call.iter().position(|a| a == flag)?;
    call.get(pos + 1).map(String::as_str)
}
