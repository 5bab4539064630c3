use psalter::definition::{DefId, DocId};
use psalter::error::{Kind, PropagationContext};
use psalter::font::CS_AVVA_SHENOUDA;
use psalter::inline::{Inline, Output, Tags};
use psalter::{Context, LanguageInfo, Settings};

fn english_document(context: &mut Context) -> (DocId, DefId) {
    let doc = context.add_document("vespers", "Vespers");
    let root = context.add_translation(doc, LanguageInfo::parse("en").unwrap(), None);
    (doc, root)
}

fn resolve(context: &mut Context, id: DefId) {
    if let Err(err) = context.handle_commands(id).and_then(|()| context.handle_font(id)) {
        panic!("resolution failed: {err}");
    }
}

fn commands_handled(context: &Context, id: DefId) -> bool {
    context.definition(id).content().unwrap().commands_handled()
}

#[test]
fn def_inserts_text_and_registers_the_reference() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let greeting = context.add_stanza(root, Some("greetingKey"), "World");
    let stanza = context.add_stanza(root, None, r"Hello \def{greetingKey}!");

    context.handle_commands(stanza).unwrap();

    assert_eq!(context.text(stanza), "Hello World!");
    assert_eq!(context.references(greeting), &[stanza]);
    assert!(commands_handled(&context, greeting));
}

#[test]
fn passes_are_idempotent() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let greeting = context.add_stanza(root, Some("greetingKey"), "World");
    let stanza = context.add_stanza(root, None, r"Hello \def{greetingKey}!");

    resolve(&mut context, stanza);
    let inlines = context.definition(stanza).content().unwrap().inlines().to_vec();
    resolve(&mut context, stanza);

    assert_eq!(context.definition(stanza).content().unwrap().inlines(), &inlines[..]);
    assert_eq!(context.references(greeting).len(), 1);
}

#[test]
fn source_without_commands_round_trips() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let source = "O come, let us worship {and} bow down | before Him";
    let stanza = context.add_stanza(root, None, source);
    resolve(&mut context, stanza);
    assert_eq!(context.text(stanza), source);
}

#[test]
fn unresolved_node_renders_as_its_source() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let stanza = context.add_stanza(root, None, r"Hello \def{greetingKey}!");
    assert_eq!(context.text(stanza), r"Hello \def{greetingKey}!");
}

#[test]
fn changing_the_source_resets_the_node() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    context.add_stanza(root, Some("greetingKey"), "World");
    let stanza = context.add_stanza(root, None, r"Hello \def{greetingKey}!");
    resolve(&mut context, stanza);

    context.set_source_text(stanza, r"Goodbye \def{greetingKey}");
    let content = context.definition(stanza).content().unwrap();
    assert!(!content.commands_handled());
    assert!(!content.font_handled());
    assert_eq!(content.inlines(), &[Inline::run(r"Goodbye \def{greetingKey}")]);

    resolve(&mut context, stanza);
    assert_eq!(context.text(stanza), "Goodbye World");
}

#[test]
fn font_pass_before_command_pass_is_an_ordering_error() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let stanza = context.add_stanza(root, None, "text");

    let err = context.handle_font(stanza).unwrap_err();
    assert_eq!(err.kind(), Kind::Ordering);
    assert!(!commands_handled(&context, stanza));
}

#[test]
fn unresolved_part_reference_is_an_ordering_error() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    context.add_stanza(root, Some("intro"), "Glory");
    let reference = context.add_part_reference(root, None, "intro");
    assert_eq!(context.handle_font(reference).unwrap_err().kind(), Kind::Ordering);
}

#[test]
fn part_reference_resolves_its_target() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let intro = context.add_stanza(root, Some("intro"), r"Glory \true");
    let reference = context.add_part_reference(root, None, "intro");
    assert_eq!(context.count_rows(reference), 0);
    assert_eq!(context.text(reference), "");

    resolve(&mut context, reference);

    assert_eq!(context.text(reference), "Glory true");
    assert_eq!(context.references(intro), &[reference]);
    assert_eq!(context.count_rows(reference), 1);
    match context.definition(reference).kind() {
        psalter::definition::DefKind::PartReference(part) => assert_eq!(part.target(), Some(intro)),
        other => panic!("unexpected definition kind {}", other.name()),
    }
}

#[test]
fn part_reference_to_a_missing_key() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let reference = context.add_part_reference(root, None, "missing");
    let err = context.handle_commands(reference).unwrap_err();
    assert_eq!(err.kind(), Kind::DefinitionNotFound);
    assert_eq!(err.title(), "no definition with key `missing`");
}

#[test]
fn section_attempts_every_child_and_returns_the_first_error() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let section = context.add_section(root, Some("psalm"), Some(r"Psalm \ternary{1|I|II}"));
    let good = context.add_stanza(section, None, "a");
    let bad = context.add_stanza(section, None, r"\def{missing}");
    let worse = context.add_stanza(section, None, r"\lines");
    let also_good = context.add_stanza(section, None, r"\true");

    let err = context.handle_commands(section).unwrap_err();
    assert_eq!(err.kind(), Kind::DefinitionNotFound);
    assert!(commands_handled(&context, good));
    assert!(!commands_handled(&context, bad));
    assert!(!commands_handled(&context, worse));
    assert!(commands_handled(&context, also_good));

    let err = context.handle_font(section).unwrap_err();
    assert_eq!(err.kind(), Kind::Ordering);
    assert!(context.definition(good).content().unwrap().font_handled());
    assert!(context.definition(also_good).content().unwrap().font_handled());
    assert_eq!(context.text(section), "Psalm I\na\n\\def{missing}\n\\lines\ntrue");
}

#[test]
fn count_rows_counts_titles_and_content() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let section = context.add_section(root, None, Some("Title"));
    context.add_stanza(section, None, "a");
    let inner = context.add_section(section, None, None);
    context.add_paragraph(inner, None, "b");
    context.add_stanza(inner, None, "c");
    assert_eq!(context.count_rows(section), 4);
    assert_eq!(context.count_rows(root), 4);
}

#[test]
fn error_records_what_was_being_resolved() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let outer = context.add_stanza(root, Some("outer"), r"see \def{inner}");
    context.add_stanza(root, Some("inner"), r"\def{missing}");

    let err = context.handle_commands(outer).unwrap_err();
    let (stack, root_error) = err.stack_view();
    assert_eq!(root_error.kind(), Kind::DefinitionNotFound);
    assert_eq!(
        stack[0].context,
        PropagationContext::Commands {
            node: outer,
            key: Some("outer".into()),
        }
    );
    assert_eq!(
        stack[1].context,
        PropagationContext::Command { name: "def".into() }
    );
    assert!(stack.iter().any(|layer| matches!(
        &layer.context,
        PropagationContext::Commands { key: Some(key), .. } if key == "inner"
    )));
}

#[test]
fn reference_cycle_trips_the_depth_guard() {
    let mut context = Context::new(Settings::default().with_max_resolution_depth(32));
    let (_, root) = english_document(&mut context);
    let a = context.add_stanza(root, Some("a"), r"\def{b}");
    let b = context.add_stanza(root, Some("b"), r"\def{a}");

    let err = context.handle_commands(a).unwrap_err();
    assert_eq!(err.kind(), Kind::DepthExceeded);
    assert!(!commands_handled(&context, a));
    assert!(!commands_handled(&context, b));

    // Breaking the cycle makes both nodes resolvable again.
    context.set_source_text(b, "end");
    resolve(&mut context, a);
    assert_eq!(context.text(a), "end");
}

#[test]
fn boolean_commands_share_one_definition() {
    let mut context = Context::default();
    let (doc, root) = english_document(&mut context);
    let first = context.add_stanza(root, None, r"\true");
    let second = context.add_stanza(root, None, r"\ternary{\true|yes|no}");
    resolve(&mut context, first);
    resolve(&mut context, second);

    let shared = context.try_lookup_definition("True", None).unwrap();
    assert_eq!(context.try_lookup_definition("True", Some(doc)), Some(shared));
    assert_eq!(context.references(shared), &[first, second]);
    assert_eq!(context.try_lookup_definition("False", None), None);
}

#[test]
fn document_boolean_is_used_before_a_global_one() {
    let mut context = Context::default();
    let (doc, root) = english_document(&mut context);
    let own = context.add_boolean(Some(doc), "True", true);
    let stanza = context.add_stanza(root, None, r"\ternary{\true|yes|no}");
    resolve(&mut context, stanza);

    assert_eq!(context.text(stanza), "yes");
    assert_eq!(context.references(own), &[stanza]);
    assert_eq!(context.try_lookup_definition("True", None), None);
}

#[test]
fn footnotes_are_numbered_per_document() {
    let mut context = Context::default();
    let (doc, root) = english_document(&mut context);
    let first = context.add_stanza(root, None, r"a\footnote{one} b\footnote{two}");
    let second = context.add_stanza(root, None, r"c\footnote{three}");
    let (other_doc, other_root) = {
        let doc = context.add_document("matins", "Matins");
        let root = context.add_translation(doc, LanguageInfo::parse("en").unwrap(), None);
        (doc, root)
    };
    let other = context.add_stanza(other_root, None, r"d\footnote{four}");

    resolve(&mut context, first);
    resolve(&mut context, second);
    resolve(&mut context, other);

    assert_eq!(context.text(first), "a[1] b[2]");
    assert_eq!(context.text(second), "c[3]");
    assert_eq!(context.text(other), "d[1]");
    let numbers: Vec<u32> = context.footnotes(Some(doc)).iter().map(|f| f.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    let bodies: Vec<String> = context
        .footnotes(Some(other_doc))
        .iter()
        .map(|f| context.inline_text(&f.body))
        .collect();
    assert_eq!(bodies, vec!["four".to_string()]);
}

#[test]
fn footnote_numbering_restarts_in_a_fresh_context() {
    for _ in 0..2 {
        let mut context = Context::default();
        let (doc, root) = english_document(&mut context);
        let stanza = context.add_stanza(root, None, r"a\footnote{one}b\footnote{two}");
        resolve(&mut context, stanza);
        let numbers: Vec<u32> = context.footnotes(Some(doc)).iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}

#[test]
fn failed_node_does_not_route_its_footnotes() {
    let mut context = Context::default();
    let (doc, root) = english_document(&mut context);
    let stanza = context.add_stanza(root, None, r"a\footnote{one} \def{missing}");
    assert!(context.handle_commands(stanza).is_err());
    assert!(context.footnotes(Some(doc)).is_empty());
}

#[test]
fn standalone_stanzas_route_footnotes_to_no_document() {
    let mut context = Context::default();
    let stanza = context.add_standalone_stanza(None, Some("loose"), r"x\footnote{note}");
    resolve(&mut context, stanza);
    assert_eq!(context.text(stanza), "x[1]");
    assert_eq!(context.footnotes(None).len(), 1);
    assert_eq!(context.try_lookup_definition("loose", None), Some(stanza));
}

#[test]
fn legacy_font_is_remapped_but_transliteration_is_not() {
    let mut context = Context::default();
    let doc = context.add_document("psalmody", "Psalmody");
    let root = context.add_translation(
        doc,
        LanguageInfo::parse("cop").unwrap(),
        Some(CS_AVVA_SHENOUDA),
    );
    let stanza = context.add_stanza(root, None, r"Pjoeic \trslit{en|Pjoeic}");

    context.handle_commands(stanza).unwrap();
    assert_eq!(context.text(stanza), "Pjoeic Pjoeis");
    assert_eq!(context.normalized_text(stanza), "Ⲡϫⲟⲉⲓⲥ Pjoeis");

    context.handle_font(stanza).unwrap();
    assert_eq!(context.text(stanza), "Ⲡϫⲟⲉⲓⲥ Pjoeis");
    assert_eq!(context.normalized_text(stanza), "Ⲡϫⲟⲉⲓⲥ Pjoeis");
}

#[test]
fn footnotes_in_a_legacy_font_are_converted() {
    let mut context = Context::default();
    let doc = context.add_document("psalmody", "Psalmody");
    let root = context.add_translation(
        doc,
        LanguageInfo::parse("cop").unwrap(),
        Some(CS_AVVA_SHENOUDA),
    );
    let stanza = context.add_stanza(root, None, r"Pjoeic\footnote{amyn}");

    context.handle_commands(stanza).unwrap();
    let body = &context.footnotes(Some(doc))[0].body;
    assert_eq!(context.normalized_inline_text(body, &Tags::default()), "ⲁⲙⲏⲛ");

    context.handle_font(stanza).unwrap();
    assert_eq!(context.text(stanza), "Ⲡϫⲟⲉⲓⲥ[1]");
    let bodies: Vec<String> = context
        .footnotes(Some(doc))
        .iter()
        .map(|f| context.inline_text(&f.body))
        .collect();
    assert_eq!(bodies, vec!["ⲁⲙⲏⲛ".to_string()]);
}

#[test]
fn default_line_separator_in_a_legacy_font_is_converted() {
    let mut context = Context::default();
    let doc = context.add_document("psalmody", "Psalmody");
    let root = context.add_translation(
        doc,
        LanguageInfo::parse("cop").unwrap(),
        Some(CS_AVVA_SHENOUDA),
    );
    context.add_stanza(root, Some("defaultLineSeparator"), " ]ai ");
    let stanza = context.add_stanza(root, None, r"\lines{|a|b}");
    resolve(&mut context, stanza);
    assert_eq!(context.text(stanza), "ⲁ ϯⲁⲓ ⲃ");
}

#[test]
fn transliterated_translation_is_not_remapped() {
    let mut context = Context::default();
    let doc = context.add_document("psalmody", "Psalmody");
    let root = context.add_translation(
        doc,
        LanguageInfo::parse("cop/en").unwrap(),
        Some(CS_AVVA_SHENOUDA),
    );
    let stanza = context.add_stanza(root, None, "Pjoeic");
    resolve(&mut context, stanza);
    assert_eq!(context.text(stanza), "Pjoeic");
}

#[test]
fn font_pass_remaps_referenced_definitions_in_their_own_font() {
    let mut context = Context::default();
    let doc = context.add_document("psalmody", "Psalmody");
    let coptic = context.add_translation(
        doc,
        LanguageInfo::parse("cop").unwrap(),
        Some(CS_AVVA_SHENOUDA),
    );
    let english = context.add_translation(doc, LanguageInfo::parse("en").unwrap(), None);
    let amen = context.add_stanza(coptic, Some("amen"), "amyn");
    let stanza = context.add_stanza(english, None, r"Amen (\def{amen})");

    resolve(&mut context, stanza);

    assert!(context.definition(amen).content().unwrap().font_handled());
    assert_eq!(context.text(amen), "ⲁⲙⲏⲛ");
    assert_eq!(context.text(stanza), "Amen (ⲁⲙⲏⲛ)");
}

#[test]
fn resolve_document_resolves_every_translation() {
    let mut context = Context::default();
    let doc = context.add_document("psalmody", "Psalmody");
    let coptic = context.add_translation(
        doc,
        LanguageInfo::parse("cop").unwrap(),
        Some(CS_AVVA_SHENOUDA),
    );
    let english = context.add_translation(doc, LanguageInfo::parse("en").unwrap(), None);
    let section = context.add_section(coptic, None, Some("Umnoc"));
    let coptic_stanza = context.add_stanza(section, None, r"Pjoeic\footnote{a}");
    let english_stanza = context.add_stanza(english, None, r"The Lord\footnote{b}");

    context.resolve_document(doc).unwrap();

    assert_eq!(context.text(section), "Ⲩⲙⲛⲟⲥ\nⲠϫⲟⲉⲓⲥ[1]");
    assert_eq!(context.text(english_stanza), "The Lord[2]");
    assert!(context.definition(coptic_stanza).content().unwrap().font_handled());
    assert_eq!(context.footnotes(Some(doc)).len(), 2);
    assert_eq!(
        context.translation(doc, &LanguageInfo::parse("cop-boh").unwrap()),
        Some(coptic)
    );
}

#[test]
fn def_output_points_at_the_definition() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let greeting = context.add_stanza(root, Some("greetingKey"), "World");
    let stanza = context.add_stanza(root, None, r"\def{greetingKey}");
    resolve(&mut context, stanza);

    match &context.definition(stanza).content().unwrap().inlines()[0] {
        Inline::Command(command) => {
            assert_eq!(command.output(), Some(&Output::Definition(greeting)))
        }
        other => panic!("unexpected inline {other:?}"),
    }
}

#[cfg(feature = "serde")]
#[test]
fn resolved_inlines_serialize() {
    let mut context = Context::default();
    let (_, root) = english_document(&mut context);
    let stanza = context.add_stanza(root, None, r"\lines{ - |a|b}\footnote{c}");
    resolve(&mut context, stanza);
    let inlines = context.definition(stanza).content().unwrap().inlines().to_vec();

    let json = serde_json::to_string(&inlines).unwrap();
    let got: Vec<Inline> = serde_json::from_str(&json).unwrap();
    assert_eq!(got, inlines);
}
