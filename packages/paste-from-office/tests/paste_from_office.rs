//! Pasting Word content through a full editor

use quire_clipboard::Clipboard;
use quire_common::Priority;
use quire_core::{Editor, EditorConfig, PasteFromOfficeConfig, PluginEntry};
use quire_engine::dev_utils::set_view_data;
use quire_engine::{DataTransfer, DomEvent, ViewNode};
use quire_paste_from_office::PasteFromOffice;
use std::cell::RefCell;
use std::rc::Rc;

const WORD_DOCUMENT: &str = r#"<html xmlns:o="urn:schemas-microsoft-com:office:office"
xmlns:w="urn:schemas-microsoft-com:office:word">
<head>
<meta http-equiv=Content-Type content="text/html; charset=utf-8">
<meta name=Generator content="Microsoft Word 15">
<style>
<!--
@list l0:level1 { mso-level-tab-stop:none; mso-level-number-position:left; }
@list l0:level2 { mso-level-number-format:bullet; mso-level-text:o; }
@list l1:level1 { mso-level-number-format:alpha-upper; }
-->
</style>
</head>
<body lang=EN-US>
<!--StartFragment-->
<p class=MsoNormal>Intro<o:p></o:p></p>
<p class=MsoListParagraphCxSpFirst style='text-indent:-.25in;mso-list:l0 level1 lfo1'><![if !supportLists]><span style='mso-list:Ignore'>1.<span style='font:7.0pt "Times New Roman"'>&nbsp;&nbsp;&nbsp;</span></span><![endif]>First<o:p></o:p></p>
<p class=MsoListParagraphCxSpMiddle style='margin-left:1.0in;text-indent:-.25in;mso-list:l0 level2 lfo1'><![if !supportLists]><span style='font-family:"Courier New"'><span style='mso-list:Ignore'>o<span style='font:7.0pt "Times New Roman"'>&nbsp;&nbsp;</span></span></span><![endif]>Nested<o:p></o:p></p>
<p class=MsoListParagraphCxSpLast style='text-indent:-.25in;mso-list:l0 level1 lfo1'><![if !supportLists]><span style='mso-list:Ignore'>2.<span style='font:7.0pt "Times New Roman"'>&nbsp;&nbsp;&nbsp;</span></span><![endif]>Second<o:p></o:p></p>
<p class=MsoNormal>Outro<o:p></o:p></p>
<h1 style='mso-list:l1 level1 lfo2'><![if !supportLists]><span style='mso-list:Ignore'>A.</span><![endif]>Chapter<o:p></o:p></h1>
<!--EndFragment-->
</body>
</html>"#;

const EXPECTED: &str = concat!(
    "<p class=\"MsoNormal\">Intro</p>",
    "<ol>",
    "<li class=\"MsoListParagraphCxSpFirst\" style=\"text-indent:-.25in\">First",
    "<ul>",
    "<li class=\"MsoListParagraphCxSpMiddle\" style=\"margin-left:1.0in;text-indent:-.25in\">Nested</li>",
    "</ul>",
    "</li>",
    "<li class=\"MsoListParagraphCxSpLast\" style=\"text-indent:-.25in\">Second</li>",
    "</ol>",
    "<p class=\"MsoNormal\">Outro</p>",
    "<ol style=\"list-style-type:upper-alpha\"><li>Chapter</li></ol>",
);

fn editor(config: EditorConfig) -> Editor {
    let mut editor = Editor::create(config, &[PluginEntry::of::<PasteFromOffice>()]).unwrap();
    set_view_data(editor.view_mut().state_mut(), "main", "[]").unwrap();
    editor.view_mut().render().unwrap();
    editor
}

fn paste_html(editor: &mut Editor, html: &str) {
    editor
        .view_mut()
        .dispatch(DomEvent::Paste {
            root: "main".to_string(),
            data_transfer: DataTransfer::new().with_data("text/html", html),
        })
        .unwrap();
}

#[test]
fn test_clipboard_is_loaded_first() {
    let editor = editor(EditorConfig::default());
    assert_eq!(editor.plugins().names(), vec!["Clipboard", "PasteFromOffice"]);
    assert!(editor.plugins().get::<PasteFromOffice>().unwrap().is_listening());
}

#[test]
fn test_word_lists_are_rebuilt() {
    let mut editor = editor(EditorConfig::default());
    paste_html(&mut editor, WORD_DOCUMENT);

    assert_eq!(editor.get_data("main").unwrap(), EXPECTED);
}

#[test]
fn test_non_word_content_is_untouched() {
    let mut editor = editor(EditorConfig::default());
    paste_html(
        &mut editor,
        "<p style=\"mso-list:l0 level1 lfo1\">Looks like a list</p>",
    );

    assert_eq!(
        editor.get_data("main").unwrap(),
        "<p style=\"mso-list:l0 level1 lfo1\">Looks like a list</p>"
    );
}

#[test]
fn test_later_listeners_see_normalized_content() {
    let mut editor = editor(EditorConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    editor
        .plugins()
        .get::<Clipboard>()
        .unwrap()
        .on_input_transformation(Priority::NORMAL, move |_, _, data| {
            let names: Vec<String> = data
                .content
                .children()
                .iter()
                .filter_map(ViewNode::as_element)
                .map(|element| element.name().to_string())
                .collect();
            log.borrow_mut().extend(names);
        });

    paste_html(&mut editor, WORD_DOCUMENT);
    assert_eq!(*seen.borrow(), vec!["p", "ol", "p", "ol"]);
}

#[test]
fn test_disabled_by_config() {
    let config = EditorConfig {
        paste_from_office: PasteFromOfficeConfig {
            enabled: false,
            ..PasteFromOfficeConfig::default()
        },
        ..EditorConfig::default()
    };
    let mut editor = editor(config);
    assert!(!editor.plugins().get::<PasteFromOffice>().unwrap().is_listening());

    paste_html(&mut editor, WORD_DOCUMENT);
    let data = editor.get_data("main").unwrap();
    assert!(!data.contains("<ol>"));
    assert!(data.contains("mso-list"));
}

#[test]
fn test_too_deep_content_is_pasted_unnormalized() {
    let config = EditorConfig {
        paste_from_office: PasteFromOfficeConfig {
            max_nesting_depth: 2,
            ..PasteFromOfficeConfig::default()
        },
        ..EditorConfig::default()
    };
    let mut editor = editor(config);

    paste_html(&mut editor, WORD_DOCUMENT);
    let data = editor.get_data("main").unwrap();
    assert!(!data.contains("<li"));
    assert!(data.contains("First"));
}

#[test]
fn test_content_deeper_than_the_parser_limit_is_still_pasted() {
    let mut editor = editor(EditorConfig::default());
    let html = format!(
        r#"<meta name=Generator content="Microsoft Word 15">{}deep text"#,
        "<div>".repeat(600)
    );

    paste_html(&mut editor, &html);
    assert!(editor.get_data("main").unwrap().contains("deep text"));
}

#[test]
fn test_same_input_gives_same_result() {
    let mut first = editor(EditorConfig::default());
    let mut second = editor(EditorConfig::default());
    paste_html(&mut first, WORD_DOCUMENT);
    paste_html(&mut second, WORD_DOCUMENT);

    assert_eq!(first.get_data("main").unwrap(), second.get_data("main").unwrap());
}
