use datatest_stable::Utf8Path;
use dpl::{compile, lexer::Token};

#[derive(thiserror::Error, Debug)]
#[error("mismatch in datatest at {0}")]
pub struct DatatestError(Box<Utf8Path>);

/// Expected errors, expected output, and source of one test file.
///
/// Lines starting with `;` above the source are comments.
struct Datatest<'a> {
    errors: Vec<&'a str>,
    expected: Vec<&'a str>,
    source: String,
    comments: Vec<&'a str>,
}

fn read_datatest(contents: &str) -> Datatest {
    #[derive(PartialEq, Eq, Debug, Default)]
    enum Section {
        #[default]
        Error,
        Expected,
        Source,
    }

    let mut section = Section::default();
    let mut test = Datatest {
        errors: vec![],
        expected: vec![],
        source: String::new(),
        comments: vec![],
    };

    for line in contents.lines() {
        if section != Section::Source && line.trim_start().starts_with(';') {
            test.comments.push(line);
            continue;
        }
        match section {
            Section::Error if line.trim_end() == "---" => section = Section::Expected,
            Section::Error => test.errors.push(line),
            Section::Expected if line.trim_end() == "---" => section = Section::Source,
            Section::Expected => test.expected.push(line),
            Section::Source => {
                if !test.source.is_empty() {
                    test.source.push('\n');
                }
                test.source.push_str(line);
            }
        }
    }
    test
}

// from https://matklad.github.io/2021/05/31/how-to-test.html
// with DATATEST_EXPECT set, rewrite the file to match what we got instead of failing.
// Comments move to the top of the file.
fn stitch_to_datatest(
    comments: &[&str],
    errors: &[String],
    output: &[String],
    source: &str,
) -> String {
    let mut lines = comments.iter().map(|line| line.to_string()).collect::<Vec<_>>();
    lines.extend(errors.iter().cloned());
    lines.push("---".to_string());
    lines.extend(output.iter().cloned());
    lines.push("---".to_string());
    lines.push(source.to_string());
    lines.join("\n")
}

fn check_sections(
    path: &Utf8Path,
    test: &Datatest,
    errors: Vec<String>,
    output: Vec<String>,
) -> datatest_stable::Result<()> {
    if std::env::var("DATATEST_EXPECT").is_ok() {
        std::fs::write(
            path,
            stitch_to_datatest(&test.comments, &errors, &output, &test.source),
        )?;
        return Ok(());
    }

    let mut failed = false;
    for (kind, expected, got) in [
        ("errors", &test.errors, &errors),
        ("output", &test.expected, &output),
    ] {
        let expected = expected.iter().map(|line| line.trim()).collect::<Vec<_>>();
        if expected != *got {
            println!(
                "error in {path}: mismatched {kind}\n\nGot:\n{}\n\nExpected:\n{}",
                got.join("\n"),
                expected.join("\n")
            );
            failed = true;
        }
    }

    if failed {
        Err(DatatestError(Box::from(path)))?
    } else {
        Ok(())
    }
}

fn translate_test(path: &Utf8Path, contents: String) -> datatest_stable::Result<()> {
    let test = read_datatest(&contents);
    let (errors, output) = match compile(&test.source) {
        Ok(commands) => (vec![], commands.iter().map(ToString::to_string).collect()),
        Err(error) => (vec![error.to_string()], vec![]),
    };
    check_sections(path, &test, errors, output)
}

fn lexer_test(path: &Utf8Path, contents: String) -> datatest_stable::Result<()> {
    let test = read_datatest(&contents);
    let mut errors = vec![];
    let mut tokens = vec![];
    let mut lexer = Token::lexer(&test.source);
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        match token {
            Ok(token) => tokens.push(format!("[{span:?}] {token:?}")),
            Err(error) => errors.push(format!("[{span:?}] {error}")),
        }
    }
    check_sections(path, &test, errors, tokens)
}

datatest_stable::harness! {
    translate_test, "test_data", r"^.*\.dpt",
    lexer_test, "test_data", r"^.*\.lxd",
}
