use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::error::RenderError;
use crate::model::Record;

// Landscape A4, in points.
const PAGE_WIDTH: i64 = 842;
const PAGE_HEIGHT: i64 = 595;
const MARGIN_X: f32 = 20.0;
const TOP_Y: f32 = 550.0;
const USABLE_WIDTH: f32 = 800.0;
const ROW_HEIGHT: f32 = 30.0;
const BOTTOM_MARGIN: f32 = 50.0;
const HEADER_FONT_SIZE: i64 = 10;
const DATA_FONT_SIZE: i64 = 8;

/// Layout cursor for one page: accumulated drawing operations plus the
/// vertical position of the next row's baseline.
struct PageLayout {
    operations: Vec<Operation>,
    cursor_y: f32,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            operations: Vec::new(),
            cursor_y: TOP_Y,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_row(operations: &mut Vec<Operation>, cells: &[String], y: f32, font_size: i64, cell_width: f32) {
    for (index, text) in cells.iter().enumerate() {
        if text.is_empty() {
            continue;
        }
        let x = MARGIN_X + index as f32 * cell_width;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), font_size.into()]));
        operations.push(Operation::new("Td", vec![x.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(text.as_str())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
}

fn draw_header(layout: &mut PageLayout, headers: &[String], cell_width: f32) {
    if headers.is_empty() {
        return;
    }
    draw_row(
        &mut layout.operations,
        headers,
        layout.cursor_y,
        HEADER_FONT_SIZE,
        cell_width,
    );
    layout.cursor_y -= ROW_HEIGHT;
}

/// Lays the merged records out as a paginated grid and serializes the result.
///
/// Columns come from the first record; the usable width is divided evenly
/// among them. When the cursor would drop below the bottom margin a fresh
/// page is started and the header row is drawn again at its top. Missing
/// values render as empty cells. An empty sequence still produces a valid
/// single-page document.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn render_pdf(records: &[Record]) -> Result<Vec<u8>, RenderError> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let headers = records
        .first()
        .map(|record| record.columns().map(str::to_string).collect::<Vec<_>>())
        .unwrap_or_default();
    let cell_width = if headers.is_empty() {
        USABLE_WIDTH
    } else {
        USABLE_WIDTH / headers.len() as f32
    };

    let mut pages = Vec::new();
    let mut layout = PageLayout::new();
    draw_header(&mut layout, &headers, cell_width);

    for record in records {
        if layout.cursor_y < BOTTOM_MARGIN {
            pages.push(std::mem::replace(&mut layout, PageLayout::new()));
            draw_header(&mut layout, &headers, cell_width);
        }

        let cells = headers
            .iter()
            .map(|name| record.get(name).unwrap_or("").to_string())
            .collect::<Vec<_>>();
        draw_row(
            &mut layout.operations,
            &cells,
            layout.cursor_y,
            DATA_FONT_SIZE,
            cell_width,
        );
        layout.cursor_y -= ROW_HEIGHT;
    }
    pages.push(layout);

    let mut page_ids = Vec::with_capacity(pages.len());
    for layout in pages {
        let content = Content {
            operations: layout.operations,
        };
        let content_id = document.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let page_count = i64::try_from(page_ids.len()).unwrap_or(i64::MAX);
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<Object>>(),
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document.compress();

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).map_err(lopdf::Error::from)?;
    Ok(bytes)
}
