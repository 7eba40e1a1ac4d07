//! End-to-end rendering: menu in, PDF file out, inspected with lopdf.

use std::path::{Path, PathBuf};

use family_menu::layout::footer_text;
use family_menu::{create_menu_pdf, find_theme, Meal, Menu, THEMES};
use lopdf::content::Content;
use lopdf::{Document, Object};

/// Decoded `Tj` strings per page, in drawing order.
fn page_strings(path: &Path) -> Vec<Vec<String>> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            Content::decode(&content)
                .unwrap()
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => Some(winansi_to_string(bytes)),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

fn winansi_to_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| family_menu::pdf::encoding::decode(b).unwrap_or('?'))
        .collect()
}

fn meal(day: &str, name: &str) -> Meal {
    Meal {
        day: day.to_string(),
        name: name.to_string(),
        ..Meal::default()
    }
}

fn fixture_fonts() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts")
}

#[test]
fn family_dinner_menu_single_page_with_builtin_fonts() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("menu.pdf");
    let menu = Menu::sample();

    let used = create_menu_pdf(&menu, &output, Some("clean_and_modern"), &dir.path().join("fonts")).unwrap();
    assert_eq!(used, "clean_and_modern");

    let pages = page_strings(&output);
    assert_eq!(pages.len(), 1);
    let lines = &pages[0];

    assert_eq!(lines[0], "Family Dinner Menu");
    assert!(lines[1].starts_with("Week of "));

    let days: Vec<&str> = menu.meals.iter().map(|m| m.day.as_str()).collect();
    let drawn_days: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|l| days.contains(l))
        .collect();
    assert_eq!(drawn_days, days);

    let expected: Vec<String> = [
        "Monday",
        "\u{2022} Grilled Chicken with Roasted Vegetables",
        "Protein: Chicken breast",
        // Helvetica is WinAnsi-encoded and has no clock glyph, so only the
        // space after it reaches the PDF. Layout still produces "\u{23F1} 35 min".
        " 35 min",
        "Tuesday",
        "\u{2022} Monday Leftovers",
        "Note: Use remaining chicken and veggies",
        "Wednesday",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(&lines[2..10], expected.as_slice());

    let theme = find_theme("clean_and_modern").unwrap();
    let footer = lines.last().unwrap();
    assert!(footer.contains("Clean And Modern"));
    assert!(footer_text(theme).starts_with(footer.trim_end()));
}

#[test]
fn long_note_is_cut_to_sixty_characters() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("menu.pdf");
    let note = "Marinate the chicken overnight in yogurt, garlic and lemon, then grill on high heat.";
    let note = format!("{note:.<90}");
    assert_eq!(note.chars().count(), 90);

    let menu = Menu {
        title: Some("Notes".to_string()),
        subtitle: Some("Week of May 05, 2025".to_string()),
        meals: vec![Meal {
            notes: Some(note.clone()),
            ..meal("Monday", "Chicken")
        }],
    };
    create_menu_pdf(&menu, &output, Some("rustic"), dir.path()).unwrap();

    let pages = page_strings(&output);
    let note_line = pages[0].iter().find(|l| l.starts_with("Note: ")).unwrap();
    let text = note_line.strip_prefix("Note: ").unwrap();
    assert_eq!(text.chars().count(), 60);
    assert!(text.ends_with("..."));
    assert_eq!(&text[..57], &note[..57]);
}

#[test]
fn unknown_theme_still_renders_with_a_known_theme() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("menu.pdf");

    let used = create_menu_pdf(&Menu::sample(), &output, Some("not_a_real_theme"), dir.path()).unwrap();
    let theme = find_theme(used).expect("theme from the table");

    let pages = page_strings(&output);
    let footer = pages.last().unwrap().last().unwrap();
    assert!(footer.contains(&theme.display_name()));
    assert!(THEMES.iter().any(|t| footer.contains(&t.display_name())));
}

#[test]
fn long_menu_spills_onto_more_pages() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("menu.pdf");
    let meals = (1..=28)
        .map(|i| Meal {
            protein: Some("Tofu".to_string()),
            prep_time: Some("20 min".to_string()),
            notes: Some("Double the batch".to_string()),
            ..meal(&format!("Day {i}"), "Curry")
        })
        .collect();
    let menu = Menu {
        title: None,
        subtitle: Some("Four weeks".to_string()),
        meals,
    };

    create_menu_pdf(&menu, &output, Some("bold_and_playful"), dir.path()).unwrap();
    let pages = page_strings(&output);
    assert!(pages.len() > 1);

    // Continuation pages start with a day label and only the last page has the footer.
    for page in &pages[1..] {
        assert!(page[0].starts_with("Day "));
    }
    for page in &pages[..pages.len() - 1] {
        assert!(!page.iter().any(|l| l.starts_with("Menu style: ")));
    }
    assert!(pages.last().unwrap().last().unwrap().starts_with("Menu style: Bold And Playful"));

    // Every meal is drawn once, in order, across the pages.
    let days: Vec<&String> = pages.iter().flatten().filter(|l| l.starts_with("Day ")).collect();
    assert_eq!(days.len(), 28);
    assert_eq!(days[0], "Day 1");
    assert_eq!(days[27], "Day 28");
}

#[test]
fn every_theme_renders() {
    let dir = tempfile::tempdir().unwrap();
    for theme in THEMES.iter() {
        let output = dir.path().join(format!("{}.pdf", theme.name));
        let used = create_menu_pdf(&Menu::sample(), &output, Some(theme.name), dir.path()).unwrap();
        assert_eq!(used, theme.name);
        assert_eq!(Document::load(&output).unwrap().get_pages().len(), 1);
    }
}

#[test]
fn registered_theme_fonts_are_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("menu.pdf");
    let menu = Menu {
        title: Some("Cabin Week".to_string()),
        subtitle: Some("Week of May 05, 2025".to_string()),
        meals: vec![Meal {
            prep_time: Some("40 min".to_string()),
            ..meal("Monday", "Soup \u{2192} Stew")
        }],
    };

    create_menu_pdf(&menu, &output, Some("rustic"), &fixture_fonts()).unwrap();
    let doc = Document::load(&output).unwrap();

    let fonts: Vec<&lopdf::Dictionary> = doc
        .objects
        .values()
        .filter_map(|o| o.as_dict().ok())
        .filter(|d| d.get(b"Type").and_then(|t| t.as_name()).ok() == Some(b"Font".as_slice()))
        .collect();
    let base_fonts: Vec<&[u8]> = fonts
        .iter()
        .filter_map(|d| d.get(b"BaseFont").and_then(|b| b.as_name()).ok())
        .collect();
    // Title and day fall back to Helvetica-Bold; the rest use the fixtures.
    assert!(base_fonts.contains(&b"Helvetica-Bold".as_slice()));
    assert!(base_fonts.contains(&b"DejaVuSerif".as_slice()));
    assert!(base_fonts.contains(&b"DejaVuSerif-Italic".as_slice()));

    let descriptors: Vec<&lopdf::Dictionary> = fonts
        .iter()
        .filter(|d| d.get(b"Subtype").and_then(|s| s.as_name()).ok() == Some(b"CIDFontType2".as_slice()))
        .map(|d| {
            let descriptor_id = d.get(b"FontDescriptor").unwrap().as_reference().unwrap();
            doc.get_dictionary(descriptor_id).unwrap()
        })
        .collect();
    assert_eq!(descriptors.len(), 2);
    for descriptor in &descriptors {
        let program_id = descriptor.get(b"FontFile2").unwrap().as_reference().unwrap();
        assert!(!doc.get_object(program_id).unwrap().as_stream().unwrap().content.is_empty());

        let angle = descriptor.get(b"ItalicAngle").unwrap().as_float().unwrap();
        match descriptor.get(b"FontName").unwrap().as_name().unwrap() {
            b"DejaVuSerif-Italic" => assert_eq!(angle, -11.0),
            _ => assert_eq!(angle, 0.0),
        }
    }

    // Strings in the embedded fonts are two-byte glyph ids. The meal line
    // "\u{2022} Soup \u{2192} Stew" keeps all 13 characters.
    let page_id = doc.get_pages()[&1];
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    let lengths: Vec<usize> = content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.len()),
            _ => None,
        })
        .collect();
    assert!(lengths.contains(&26));
}
