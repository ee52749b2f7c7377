//! Integration tests for the pagination pipeline.

use pressflow::{
    decompose, paginate, paginate_with, paginate_with_stats, FixedHeightMeasurer, LayoutConfig,
    PaginateOptions, PublicationMetadata, RenderedPage, TableOfContents, TextMetricsMeasurer,
    TocEntry, Typography, UnitKind,
};

/// Single-column page whose content area is `content_height` tall under the default chrome.
fn single_column(content_height: f32) -> PaginateOptions {
    let layout = LayoutConfig::default()
        .with_columns(1)
        .with_page_size(210.0, content_height + 55.0);
    PaginateOptions::new().with_layout(layout)
}

/// Measurer reporting 350mm for images and 80mm for everything else.
fn fixed_heights() -> FixedHeightMeasurer<impl FnMut(&str, f32, &Typography) -> f32> {
    FixedHeightMeasurer::new(|markup: &str, _: f32, _: &Typography| {
        if markup.contains("<img") {
            350.0
        } else {
            80.0
        }
    })
}

fn long_article(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "<p>Paragraph {} {}</p>",
                i,
                "lorem ipsum dolor sit amet consectetur ".repeat(i % 7 + 3)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unit_counts(pages: &[RenderedPage]) -> Vec<usize> {
    pages
        .iter()
        .map(|p| {
            let (first, last) = p.unit_range.unwrap();
            last - first + 1
        })
        .collect()
}

#[test]
fn test_three_paragraphs_on_two_pages() {
    let markup = "<p>one</p><p>two</p><p>three</p>";
    let pages = paginate_with(
        markup,
        &PublicationMetadata::default(),
        &single_column(200.0),
        &mut fixed_heights(),
    )
    .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(unit_counts(&pages), vec![2, 1]);
    assert!(pages[0].html.contains("<p>one</p>") && pages[0].html.contains("<p>two</p>"));
    assert!(pages[1].html.contains("<p>three</p>"));
}

#[test]
fn test_oversized_image_is_scaled_on_its_own_page() {
    let markup = "<p>before</p><img src=\"tall.jpg\"/><p>after</p>";
    let result = paginate_with_stats(
        markup,
        &PublicationMetadata::default(),
        &single_column(250.0),
        &mut fixed_heights(),
    )
    .unwrap();

    assert_eq!(result.pages.len(), 3);
    assert_eq!(result.stats.scaled_image_count, 1);
    assert_eq!(result.stats.overflowed_page_count, 0);

    let image_page = &result.pages[1].html;
    assert!(image_page.contains("fit-image"));
    assert!(image_page.contains("height:250.00mm"));
    assert!(image_page.contains("data-scale=\"0.7143\""));
}

#[test]
fn test_oversized_text_overflows_without_truncation() {
    let table = format!("<table>{}</table>", "<tr><td>row</td></tr>".repeat(3));
    let markup = format!("<p>intro</p>{}<p>outro</p>", table);
    let mut measurer = FixedHeightMeasurer::new(|markup: &str, _: f32, _: &Typography| {
        if markup.starts_with("<table") {
            900.0
        } else {
            20.0
        }
    });
    let pages = paginate_with(
        &markup,
        &PublicationMetadata::default(),
        &single_column(200.0),
        &mut measurer,
    )
    .unwrap();

    assert_eq!(pages.len(), 3);
    assert!(pages[1].overflowed);
    assert!(pages[1].html.contains(&table));
    assert!(!pages[0].overflowed && !pages[2].overflowed);
}

#[test]
fn test_completeness_and_order() {
    let markup = long_article(120);
    let metadata = PublicationMetadata::new("Review")
        .with_title("Long read")
        .with_author("Writer");
    let units = decompose(&markup, &metadata).unwrap();
    let pages = paginate(&markup, &metadata).unwrap();

    assert!(pages.len() > 1);
    let mut expected_next = 0;
    for page in &pages {
        let (first, last) = page.unit_range.unwrap();
        assert_eq!(first, expected_next, "gap or reorder before page {}", page.page_number);
        assert!(last >= first);
        expected_next = last + 1;
    }
    assert_eq!(expected_next, units.len());
}

#[test]
fn test_atomicity_every_unit_on_exactly_one_page() {
    let markup = long_article(80);
    let metadata = PublicationMetadata::new("Review");
    let units = decompose(&markup, &metadata).unwrap();
    let pages = paginate(&markup, &metadata).unwrap();

    for unit in &units {
        let holders = pages.iter().filter(|p| p.html.contains(&unit.markup)).count();
        assert_eq!(holders, 1, "unit {} appears on {} pages", unit.order_index, holders);
    }
}

#[test]
fn test_determinism() {
    let markup = long_article(60);
    let metadata = PublicationMetadata::new("Review").with_theme_color("#336699");
    let first = paginate(&markup, &metadata).unwrap();
    let second = paginate(&markup, &metadata).unwrap();
    assert_eq!(first, second);

    let mut measurer = TextMetricsMeasurer::new();
    let options = PaginateOptions::default();
    let cold = paginate_with(&markup, &metadata, &options, &mut measurer).unwrap();
    let warm = paginate_with(&markup, &metadata, &options, &mut measurer).unwrap();
    assert_eq!(cold, warm);
    assert!(measurer.cache_hits() > 0);
}

#[test]
fn test_virtual_units_lead_in_order() {
    let metadata = PublicationMetadata::new("Review")
        .with_title("Feature")
        .with_author("Writer")
        .with_hero_image("hero.jpg")
        .with_table_of_contents(TableOfContents::Entries(vec![
            TocEntry::new("Opening", Some("1")),
            TocEntry::new("Closing", None),
        ]));
    let units = decompose("<p>body</p>", &metadata).unwrap();

    let kinds: Vec<UnitKind> = units.iter().map(|u| u.kind).collect();
    assert_eq!(
        kinds,
        vec![
            UnitKind::TitleBlock,
            UnitKind::HeroImage,
            UnitKind::TableOfContents,
            UnitKind::Paragraph
        ]
    );

    let pages = paginate("<p>body</p>", &metadata).unwrap();
    let html = &pages[0].html;
    let title = html.find("article-title").unwrap();
    let hero = html.find("hero-image").unwrap();
    let toc = html.find("table-of-contents").unwrap();
    let body = html.find("<p>body</p>").unwrap();
    assert!(title < hero && hero < toc && toc < body);
}

#[test]
fn test_empty_document() {
    let pages = paginate("   \n ", &PublicationMetadata::new("Review")).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn test_malformed_document_yields_no_pages() {
    let metadata = PublicationMetadata::new("Review");
    for markup in ["<p>one</p><p>two", "<div><p>x</div></p>", "<p>x</p></section>"] {
        let err = paginate(markup, &metadata).unwrap_err();
        assert!(err.is_malformed_document(), "{}: {}", markup, err);
    }
}

#[test]
fn test_unit_taller_than_page_sits_alone() {
    let mut measurer = FixedHeightMeasurer::new(|markup: &str, _: f32, _: &Typography| {
        if markup.contains("huge") {
            1000.0
        } else {
            10.0
        }
    });
    let pages = paginate_with(
        "<p>a</p><p>huge</p><p>b</p>",
        &PublicationMetadata::default(),
        &PaginateOptions::default(),
        &mut measurer,
    )
    .unwrap();
    assert_eq!(unit_counts(&pages), vec![1, 1, 1]);
    assert!(pages[1].overflowed);
}
