//! spotweb - run the streaming server from its bundled virtual environment
//!
//! Every argument is handed to `src/spotweb.py` unchanged:
//!
//! ```bash
//! spotweb --port 8080 --debug
//! # becomes
//! <base>/env/bin/python <base>/src/spotweb.py --port 8080 --debug
//! ```

use spotweb_env::{Launcher, Layout};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<_> = std::env::args_os().skip(1).collect();

    let result = Layout::from_current_exe().and_then(|layout| Launcher::new(layout).launch(args));
    match result {
        Ok(code) => code,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:#}", anyhow::Error::from(e));
            ExitCode::from(code)
        }
    }
}
