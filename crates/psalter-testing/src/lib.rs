/*!
Psalter unit testing library

This is a crate for writing unit tests for code that uses Psalter.
It is used for the tests of the Psalter commands,
    so those tests are good examples of what this crate can do.

## Test setup

Every test resolves one or more snippets of source text.
Each snippet becomes a stanza in a fresh [`Context`] holding one document
    with one translation.
By default the translation is English with no font;
    this can be changed with [`TestOption::Language`] and [`TestOption::Font`].
Other definitions the snippet refers to are added with [`TestOption::Definitions`]
    or, for anything more involved, with [`TestOption::CustomContextInitialization`].

Both resolution passes are run, and then run a second time to check that they are idempotent.

## Test types

### Resolution equality tests

Run using [`run_resolution_equality_test`].

These tests verify that two snippets resolve to the same text.
For example, with a definition `greetingKey` holding `World`, a test can verify that
```text
Hello \def{greetingKey}!
```
and
```text
Hello World!
```
resolve to the same text.

### Footnote tests

Run using [`run_footnote_test`].

These tests verify the footnotes a snippet routes to its document.

### Failure tests

Run using [`run_failure_test`].

These tests verify that a snippet fails to resolve,
    optionally with a specific [error kind](psalter::error::Kind).

## The test suite macro

The preferred way to write a suite of unit tests is to use the [`test_suite`] macro.
See the macro's documentation for instructions on using it.
*/

use psalter::definition::{DefId, DocId};
use psalter::error;
use psalter::{Context, LanguageInfo, Settings};

/// Option passed to a test runner.
pub enum TestOption<'a> {
    /// Stanzas added to the document before the test source, as `(key, source)` pairs.
    ///
    /// Accumulates with previous `Definitions` options.
    Definitions(&'a [(&'a str, &'a str)]),

    /// The provided static function is invoked after the document is created
    ///     and before the test source is added.
    ///
    /// Overrides previous `CustomContextInitialization` or `CustomContextInitializationDyn` options.
    CustomContextInitialization(fn(&mut Context, DocId)),

    /// The provided closure is invoked after the document is created
    ///     and before the test source is added.
    ///
    /// Overrides previous `CustomContextInitialization` or `CustomContextInitializationDyn` options.
    #[allow(clippy::type_complexity)]
    CustomContextInitializationDyn(Box<dyn Fn(&mut Context, DocId) + 'a>),

    /// Language tag of the translation the test source is in.
    ///
    /// Overrides previous `Language` options.
    Language(&'a str),

    /// Font of the translation the test source is in.
    ///
    /// Overrides previous `Font` options.
    Font(&'a str),

    /// Settings of the context.
    ///
    /// Overrides previous `Settings` options.
    Settings(fn() -> Settings),

    /// Whether to run the font pass.
    ///
    /// Overrides previous `FontPass` options.
    FontPass(bool),
}

struct ResolvedOptions<'a> {
    definitions: Vec<(&'a str, &'a str)>,
    custom_context_initialization: &'a dyn Fn(&mut Context, DocId),
    language: &'a str,
    font: Option<&'a str>,
    settings: fn() -> Settings,
    font_pass: bool,
}

impl<'a> ResolvedOptions<'a> {
    fn new(options: &'a [TestOption<'a>]) -> Self {
        let mut resolved = Self {
            definitions: vec![],
            custom_context_initialization: &|_, _| {},
            language: "en",
            font: None,
            settings: Settings::default,
            font_pass: true,
        };
        for option in options {
            match option {
                TestOption::Definitions(d) => resolved.definitions.extend_from_slice(d),
                TestOption::CustomContextInitialization(f) => {
                    resolved.custom_context_initialization = f
                }
                TestOption::CustomContextInitializationDyn(f) => {
                    resolved.custom_context_initialization = f
                }
                TestOption::Language(l) => resolved.language = *l,
                TestOption::Font(f) => resolved.font = Some(*f),
                TestOption::Settings(f) => resolved.settings = *f,
                TestOption::FontPass(b) => resolved.font_pass = *b,
            }
        }
        resolved
    }
}

/// A context with the test document and an unresolved stanza holding the source.
pub struct Fixture {
    pub context: Context,
    pub doc: DocId,
    pub stanza: DefId,
}

fn initialize(source: &str, options: &ResolvedOptions) -> Fixture {
    let mut context = Context::new((options.settings)());
    let doc = context.add_document("testing", "Testing");
    let language = match LanguageInfo::parse(options.language) {
        None => panic!("invalid language tag `{}` in test options", options.language),
        Some(language) => language,
    };
    let root = context.add_translation(doc, language, options.font);
    for (key, definition) in &options.definitions {
        context.add_stanza(root, Some(*key), *definition);
    }
    (options.custom_context_initialization)(&mut context, doc);
    let stanza = context.add_stanza(root, None, source);
    Fixture {
        context,
        doc,
        stanza,
    }
}

fn resolve(fixture: &mut Fixture, options: &ResolvedOptions) -> Result<(), Box<error::Error>> {
    fixture.context.handle_commands(fixture.stanza)?;
    if options.font_pass {
        fixture.context.handle_font(fixture.stanza)?;
    }
    Ok(())
}

/// Resolves the source and returns the fixture, panicking if resolution fails.
///
/// Both passes are run twice and the text must not change the second time.
pub fn resolve_source(source: &str, options: &[TestOption]) -> Fixture {
    let options = ResolvedOptions::new(options);
    let mut fixture = initialize(source, &options);
    if let Err(err) = resolve(&mut fixture, &options) {
        println!("{err}");
        panic!("resolution of {source:?} failed");
    }
    let first = fixture.context.text(fixture.stanza);
    let num_footnotes = fixture.context.footnotes(Some(fixture.doc)).len();
    if let Err(err) = resolve(&mut fixture, &options) {
        println!("{err}");
        panic!("second resolution of {source:?} failed");
    }
    assert_eq!(
        first,
        fixture.context.text(fixture.stanza),
        "second resolution changed the text"
    );
    assert_eq!(
        num_footnotes,
        fixture.context.footnotes(Some(fixture.doc)).len(),
        "second resolution added footnotes"
    );
    fixture
}

/// Run a resolution equality test.
///
/// The test passes if the two provided snippets resolve to the same text.
pub fn run_resolution_equality_test(lhs: &str, rhs: &str, options: &[TestOption]) {
    let fixture_1 = resolve_source(lhs, options);
    let fixture_2 = resolve_source(rhs, options);
    let text_1 = fixture_1.context.text(fixture_1.stanza);
    let text_2 = fixture_2.context.text(fixture_2.stanza);
    if text_1 != text_2 {
        println!("Resolved text is different:");
        println!("------[lhs]------");
        println!("'{text_1}'");
        println!("------[rhs]------");
        println!("'{text_2}'");
        println!("-----------------");
        panic!("Resolution equality test failed");
    }
}

/// Run a footnote test.
///
/// The test passes if the snippet routes footnotes with the provided bodies to its document,
///     numbered from 1 in order.
pub fn run_footnote_test(input: &str, bodies: &[&str], options: &[TestOption]) {
    let fixture = resolve_source(input, options);
    let footnotes: Vec<(u32, String)> = fixture
        .context
        .footnotes(Some(fixture.doc))
        .iter()
        .map(|footnote| (footnote.number, fixture.context.inline_text(&footnote.body)))
        .collect();
    let want: Vec<(u32, String)> = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| (i as u32 + 1, body.to_string()))
        .collect();
    assert_eq!(footnotes, want);
}

/// Run a failure test.
///
/// The test passes if resolution of the provided snippet fails and,
///     if a kind is provided, the root error has that kind.
pub fn run_failure_test(input: &str, kind: Option<error::Kind>, options: &[TestOption]) {
    let options = ResolvedOptions::new(options);
    let mut fixture = initialize(input, &options);
    match resolve(&mut fixture, &options) {
        Ok(()) => {
            println!("Resolution succeeded:");
            println!("{}", fixture.context.text(fixture.stanza));
            panic!("Resolution failure test did not pass: resolution successful");
        }
        Err(err) => {
            println!("{err}");
            if let Some(kind) = kind {
                assert_eq!(err.kind(), kind, "unexpected error kind");
            }
            assert!(
                !fixture
                    .context
                    .definition(fixture.stanza)
                    .content()
                    .map(|content| content.commands_handled())
                    .unwrap_or(false),
                "a node that failed to resolve must stay unparsed"
            );
        }
    }
}

/// Macro to generate a suite of unit tests
///
/// The general use of this macros looks like this:
/// ```
/// # use psalter_testing::*;
/// test_suite![
///     options(TestOption::Definitions(&[("greetingKey", "World")])),
///     resolution_equality_tests(
///         (case_1, r"Hello \def{greetingKey}!", "Hello World!"),
///     ),
///     footnote_tests(
///         (case_2, r"A\footnote{one}", ["one"]),
///     ),
///     failure_tests(
///         (case_3, r"\def{missing}"),
///     ),
///     error_kind_tests(
///         (case_4, r"\def{missing}", psalter::error::Kind::DefinitionNotFound),
///     ),
/// ];
/// ```
///
/// The arguments to the macro are:
///
/// - `options(option_1, option_2, ..., option_n)`: options to pass to the test runner.
///     This is a list of values of type [TestOption].
///     The options can be omitted, in which case no options are passed.
///
/// - `resolution_equality_tests(cases...)`: a list of resolution equality test cases.
///     Each case is of the form (case name, left hand side, right hand side).
///     The data here is fed into the [run_resolution_equality_test] test runner.
///
/// - `footnote_tests(cases...)`: a list of footnote test cases.
///     Each case is of the form (case name, input, footnote bodies).
///     The data here is fed into the [run_footnote_test] test runner.
///
/// - `failure_tests(cases...)`: a list of failure test cases.
///     Each case is of the form (case name, input).
///     The data here is fed into the [run_failure_test] test runner.
///
/// - `error_kind_tests(cases...)`: like failure tests, with an expected error kind.
///     Each case is of the form (case name, input, kind).
///
/// Only one `options()` argument may be provided, and if provided it must be in the first position.
/// Zero or more of the other arguments may be provided, and in any order.
#[macro_export]
macro_rules! test_suite {
    ( options $options: tt, resolution_equality_tests ( $( ($name: ident, $lhs: expr, $rhs: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let lhs = $lhs;
                let rhs = $rhs;
                let options = vec! $options;
                psalter_testing::run_resolution_equality_test(&lhs, &rhs, &options);
            }
        )*
    );
    ( options $options: tt, resolution_equality_tests $test_body: tt $(,)? ) => (
        compile_error!("Invalid test cases for resolution_equality_tests: must be a list of tuples (name, lhs, rhs)");
    );
    ( options $options: tt, footnote_tests ( $( ($name: ident, $input: expr, $bodies: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let bodies = $bodies;
                let options = vec! $options;
                psalter_testing::run_footnote_test(&input, &bodies, &options);
            }
        )*
    );
    ( options $options: tt, failure_tests ( $( ($name: ident, $input: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let options = vec! $options;
                psalter_testing::run_failure_test(&input, None, &options);
            }
        )*
    );
    ( options $options: tt, error_kind_tests ( $( ($name: ident, $input: expr, $kind: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let options = vec! $options;
                psalter_testing::run_failure_test(&input, Some($kind), &options);
            }
        )*
    );
    ( options $options: tt, $test_kind: ident $test_cases: tt $(,)? ) => (
        compile_error!("Invalid keyword: test_suite! only accepts the following keywords: `options`, `resolution_equality_tests`, `footnote_tests`, `failure_tests`, `error_kind_tests`");
    );
    ( options $options: tt, $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        $(
            psalter_testing::test_suite![options $options, $test_kind $test_cases,];
        )+
    );
    ( $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        psalter_testing::test_suite![options (), $( $test_kind $test_cases, )+ ];
    );
}
