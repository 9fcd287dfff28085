#![allow(dead_code, unused_imports)]

pub use testherd_test_utils::builders;
pub use testherd_test_utils::fake_executor;
pub use testherd_test_utils::{MockFileSystem, init_tracing, with_timeout};

use std::error::Error;

pub type TestResult = Result<(), Box<dyn Error>>;

/// A JS test program with a direct-invocation guard.
pub const RUNNABLE_JS: &str = r#"
async function main() {
  console.log("Total: 2, Passed: 2, Failed: 0");
}

if (require.main === module) {
  main();
}
"#;

/// A shared module exporting an object.
pub const UTILITY_JS: &str = r#"
module.exports = {
  login: async (page) => page.goto("/login"),
};
"#;

/// Shell script body: prints `stdout` and exits with `code`.
pub fn sh_script(stdout: &str, code: i32) -> String {
    format!("#!/bin/sh\necho \"{stdout}\"\nexit {code}\n")
}
