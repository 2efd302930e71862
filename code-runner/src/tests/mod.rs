use std::time::{Duration, Instant};

use crate::{
    explain::explain,
    languages::{skip_if_not_available, PythonRunner},
    runner::Runner,
    types::{ExecutionRequest, Language, EXIT_TIMEOUT, EXIT_TOOLCHAIN_MISSING},
};

mod test_cases {
    pub const PYTHON_SUM: &str = "print(1+1)";
    pub const PYTHON_SPIN: &str = "while True: pass";
    pub const PYTHON_SLOW_AFTER_PRINT: &str = r#"
import time
print("started", flush=True)
time.sleep(30)
"#;
    pub const PYTHON_EXIT_3: &str = "import sys\nsys.exit(3)";
    pub const PYTHON_NAME_ERROR: &str = "print(missing_name)";
    pub const JAVA_HELLO: &str = r#"
public class Main {
    public static void main(String[] args) {
        System.out.println("Hello from Java!");
    }
}
"#;
    pub const JAVA_MISSING_SEMICOLON: &str = r#"
public class Main {
    public static void main(String[] args) {
        System.out.println("broken")
    }
}
"#;
    pub const JAVA_STATEMENT_ONLY: &str = r#"System.out.println("wrapped snippet");"#;
}

fn request(language: Language, code: &str, timeout_secs: u64) -> ExecutionRequest {
    ExecutionRequest {
        language,
        code: code.to_string(),
        timeout: Duration::from_secs(timeout_secs),
    }
}

#[tokio::test]
async fn python_trivial_code_succeeds() {
    if skip_if_not_available(&["python3"]) {
        return;
    }

    let result = Runner::new()
        .run(&request(Language::Python, test_cases::PYTHON_SUM, 5))
        .await;

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "2\n");
    assert!(result.stderr.is_empty());
    assert!(result.success());
}

#[tokio::test]
async fn python_infinite_loop_times_out_within_budget() {
    if skip_if_not_available(&["python3"]) {
        return;
    }

    let started = Instant::now();
    let result = Runner::new()
        .run(&request(Language::Python, test_cases::PYTHON_SPIN, 2))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(result.exit_code, EXIT_TIMEOUT);
    assert!(result.stderr.contains("timed out"));
    // Budget plus bounded kill/reap overhead.
    assert!(elapsed < Duration::from_secs(4), "took {:?}", elapsed);
}

#[tokio::test]
async fn python_timeout_preserves_partial_stdout() {
    if skip_if_not_available(&["python3"]) {
        return;
    }

    let result = Runner::new()
        .run(&request(
            Language::Python,
            test_cases::PYTHON_SLOW_AFTER_PRINT,
            2,
        ))
        .await;

    assert_eq!(result.exit_code, EXIT_TIMEOUT);
    assert!(result.stdout.contains("started"));
}

#[tokio::test]
async fn missing_interpreter_reports_toolchain_sentinel() {
    let runner = Runner::new();
    let language = PythonRunner::new(Some("definitely-not-a-real-python".to_string()));

    let result = runner
        .run_with(&language, &request(Language::Python, test_cases::PYTHON_SUM, 5))
        .await;

    assert_eq!(result.exit_code, EXIT_TOOLCHAIN_MISSING);
    assert!(result.stderr.contains("definitely-not-a-real-python"));
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn python_nonzero_exit_is_surfaced_verbatim() {
    if skip_if_not_available(&["python3"]) {
        return;
    }

    let result = Runner::new()
        .run(&request(Language::Python, test_cases::PYTHON_EXIT_3, 5))
        .await;

    assert_eq!(result.exit_code, 3);
}

#[tokio::test]
async fn python_exception_is_explained() {
    if skip_if_not_available(&["python3"]) {
        return;
    }

    let result = Runner::new()
        .run(&request(Language::Python, test_cases::PYTHON_NAME_ERROR, 5))
        .await;

    assert_ne!(result.exit_code, 0);
    assert!(result.stderr.contains("NameError"));

    let sentence = explain(&result.stderr, Language::Python);
    assert!(sentence.starts_with("Detected runtime exception"));
    assert!(sentence.contains("NameError"));
}

#[tokio::test]
async fn java_hello_compiles_and_runs() {
    if skip_if_not_available(&["javac", "java"]) {
        return;
    }

    let result = Runner::new()
        .run(&request(Language::Java, test_cases::JAVA_HELLO, 30))
        .await;

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("Hello from Java!"));
}

#[tokio::test]
async fn java_compile_failure_skips_run_and_returns_compiler_output() {
    if skip_if_not_available(&["javac", "java"]) {
        return;
    }

    let result = Runner::new()
        .run(&request(Language::Java, test_cases::JAVA_MISSING_SEMICOLON, 30))
        .await;

    assert_ne!(result.exit_code, 0);
    assert!(result.stderr.contains("error:"));
    // The run phase never happened, so the snippet's output is absent.
    assert!(!result.stdout.contains("broken"));

    let sentence = explain(&result.stderr, Language::Java);
    assert!(sentence.starts_with("Compilation error detected"));
}

#[tokio::test]
async fn java_statement_snippet_is_wrapped_and_runs() {
    if skip_if_not_available(&["javac", "java"]) {
        return;
    }

    let result = Runner::new()
        .run(&request(Language::Java, test_cases::JAVA_STATEMENT_ONLY, 30))
        .await;

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("wrapped snippet"));
}
