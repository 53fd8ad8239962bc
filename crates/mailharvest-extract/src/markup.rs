//! Tolerant scanner for the HTML vendors put in confirmation emails.
//!
//! This is not a DOM: the strategies only ever need the flattened visible
//! text, the tables with their rows and cells, and the text of each `<div>`
//! container. The scanner recovers exactly those three views in one pass and
//! never fails; malformed markup degrades to being treated as text.
//!
//! Structural ownership is nearest-enclosing: a row belongs to the innermost
//! open table, a cell to the innermost open row. Flattened text views
//! (document, table, div) still include everything nested inside them.

/// One parsed HTML document, reduced to the views extraction needs.
#[derive(Debug)]
pub struct Document {
    text: String,
    tables: Vec<Table>,
    blocks: Vec<String>,
}

/// A `<table>` element with its flattened text and parsed rows.
#[derive(Debug)]
pub struct Table {
    text: String,
    rows: Vec<TableRow>,
}

/// A `<tr>` element as a list of cell texts.
#[derive(Debug)]
pub struct TableRow {
    cells: Vec<String>,
}

impl Document {
    /// Scan an HTML fragment. Infallible; anything unrecognizable is text.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let mut tokenizer = Tokenizer::new(html);
        let mut builder = DocumentBuilder::default();
        let mut skip_until: Option<&str> = None;

        while let Some(event) = tokenizer.next_event() {
            if let Some(until) = skip_until {
                if let Event::Close(name) = event {
                    if name.eq_ignore_ascii_case(until) {
                        skip_until = None;
                    }
                }
                continue;
            }
            match event {
                Event::Text(text) => builder.push_text(text),
                Event::Open(name) => {
                    if name.eq_ignore_ascii_case("script") {
                        skip_until = Some("script");
                    } else if name.eq_ignore_ascii_case("style") {
                        skip_until = Some("style");
                    } else {
                        builder.open_tag(name);
                    }
                }
                Event::Close(name) => builder.close_tag(name),
            }
        }

        builder.finish()
    }

    /// Flattened visible text, with block-level tags contributing line
    /// breaks.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All tables in document order, nested ones included.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Flattened text of every `<div>` in document order. Nested divs
    /// appear both on their own and inside their ancestors' text.
    #[must_use]
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }
}

impl Table {
    /// Flattened text of the whole table subtree.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed rows. Rows owned by nested tables are not repeated here.
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }
}

impl TableRow {
    /// Trimmed cell texts in column order.
    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

enum Event<'a> {
    Open(&'a str),
    Close(&'a str),
    Text(&'a str),
}

/// Minimal tag tokenizer. Attributes are irrelevant to extraction and are
/// skipped wholesale; a stray `<` that opens no tag is literal text.
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_event(&mut self) -> Option<Event<'a>> {
        loop {
            let rest = self.input.get(self.pos..)?;
            if rest.is_empty() {
                return None;
            }
            let Some(after_lt) = rest.strip_prefix('<') else {
                let end = rest.find('<').unwrap_or(rest.len());
                self.pos += end;
                return Some(Event::Text(&rest[..end]));
            };
            match after_lt.as_bytes().first() {
                Some(b'!') => {
                    if after_lt.starts_with("!--") {
                        match rest.find("-->") {
                            Some(end) => self.pos += end + 3,
                            None => self.pos = self.input.len(),
                        }
                    } else {
                        self.skip_past_gt();
                    }
                }
                Some(b'?') => self.skip_past_gt(),
                Some(b'/') => {
                    let name = tag_name(&after_lt[1..]);
                    self.skip_past_gt();
                    if !name.is_empty() {
                        return Some(Event::Close(name));
                    }
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    let name = tag_name(after_lt);
                    self.skip_past_gt();
                    return Some(Event::Open(name));
                }
                _ => {
                    self.pos += 1;
                    return Some(Event::Text("<"));
                }
            }
        }
    }

    fn skip_past_gt(&mut self) {
        match self.input[self.pos..].find('>') {
            Some(off) => self.pos += off + 1,
            None => self.pos = self.input.len(),
        }
    }
}

fn tag_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(s.len());
    &s[..end]
}

fn is_block_tag(name: &str) -> bool {
    const BLOCK_TAGS: [&str; 15] = [
        "p", "br", "hr", "div", "table", "tr", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5",
        "h6",
    ];
    BLOCK_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag))
}

#[derive(Default)]
struct DocumentBuilder {
    text: String,
    seq: usize,
    open_divs: Vec<(usize, String)>,
    finished_divs: Vec<(usize, String)>,
    table_stack: Vec<(usize, TableBuilder)>,
    finished_tables: Vec<(usize, Table)>,
}

impl DocumentBuilder {
    fn push_text(&mut self, raw: &str) {
        let decoded = decode_entities(raw);
        self.text.push_str(&decoded);
        for (_, buf) in &mut self.open_divs {
            buf.push_str(&decoded);
        }
        for (_, table) in &mut self.table_stack {
            table.text.push_str(&decoded);
        }
        if let Some((_, table)) = self.table_stack.last_mut() {
            table.push_cell_text(&decoded);
        }
    }

    fn push_break(&mut self) {
        self.text.push('\n');
        for (_, buf) in &mut self.open_divs {
            buf.push('\n');
        }
        for (_, table) in &mut self.table_stack {
            table.text.push('\n');
        }
        if let Some((_, table)) = self.table_stack.last_mut() {
            table.push_cell_text("\n");
        }
    }

    fn open_tag(&mut self, name: &str) {
        if name.eq_ignore_ascii_case("table") {
            self.push_break();
            let seq = self.next_seq();
            self.table_stack.push((seq, TableBuilder::default()));
        } else if name.eq_ignore_ascii_case("tr") {
            self.push_break();
            if let Some((_, table)) = self.table_stack.last_mut() {
                table.start_row();
            }
        } else if name.eq_ignore_ascii_case("td") || name.eq_ignore_ascii_case("th") {
            if let Some((_, table)) = self.table_stack.last_mut() {
                table.start_cell();
            }
        } else if name.eq_ignore_ascii_case("div") {
            self.push_break();
            let seq = self.next_seq();
            self.open_divs.push((seq, String::new()));
        } else if is_block_tag(name) {
            self.push_break();
        }
    }

    fn close_tag(&mut self, name: &str) {
        if name.eq_ignore_ascii_case("table") {
            if let Some((seq, table)) = self.table_stack.pop() {
                self.finished_tables.push((seq, table.finish()));
            }
            self.push_break();
        } else if name.eq_ignore_ascii_case("tr") {
            if let Some((_, table)) = self.table_stack.last_mut() {
                table.finish_row();
            }
            self.push_break();
        } else if name.eq_ignore_ascii_case("td") || name.eq_ignore_ascii_case("th") {
            if let Some((_, table)) = self.table_stack.last_mut() {
                table.finish_cell();
            }
        } else if name.eq_ignore_ascii_case("div") {
            if let Some(block) = self.open_divs.pop() {
                self.finished_divs.push(block);
            }
            self.push_break();
        } else if is_block_tag(name) {
            self.push_break();
        }
    }

    fn next_seq(&mut self) -> usize {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    fn finish(mut self) -> Document {
        while let Some((seq, table)) = self.table_stack.pop() {
            self.finished_tables.push((seq, table.finish()));
        }
        self.finished_divs.append(&mut self.open_divs);

        self.finished_tables.sort_by_key(|(seq, _)| *seq);
        self.finished_divs.sort_by_key(|(seq, _)| *seq);

        Document {
            text: self.text,
            tables: self.finished_tables.into_iter().map(|(_, t)| t).collect(),
            blocks: self.finished_divs.into_iter().map(|(_, b)| b).collect(),
        }
    }
}

#[derive(Default)]
struct TableBuilder {
    text: String,
    rows: Vec<TableRow>,
    row: Option<RowBuilder>,
}

#[derive(Default)]
struct RowBuilder {
    cells: Vec<String>,
    cell: Option<String>,
}

impl TableBuilder {
    fn start_row(&mut self) {
        self.finish_row();
        self.row = Some(RowBuilder::default());
    }

    fn finish_row(&mut self) {
        if let Some(mut row) = self.row.take() {
            row.finish_cell();
            if !row.cells.is_empty() {
                self.rows.push(TableRow { cells: row.cells });
            }
        }
    }

    fn start_cell(&mut self) {
        let row = self.row.get_or_insert_with(RowBuilder::default);
        row.finish_cell();
        row.cell = Some(String::new());
    }

    fn finish_cell(&mut self) {
        if let Some(row) = &mut self.row {
            row.finish_cell();
        }
    }

    fn push_cell_text(&mut self, text: &str) {
        if let Some(row) = &mut self.row {
            if let Some(cell) = &mut row.cell {
                cell.push_str(text);
            }
        }
    }

    fn finish(mut self) -> Table {
        self.finish_row();
        Table {
            text: self.text,
            rows: self.rows,
        }
    }
}

impl RowBuilder {
    fn finish_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            self.cells.push(cell.trim().to_string());
        }
    }
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some((decoded, consumed)) = decode_entity(rest) {
            out.push(decoded);
            rest = &rest[consumed..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(s: &str) -> Option<(char, usize)> {
    let end = s[1..].find(';')? + 1;
    if end > 10 {
        return None;
    }
    let body = &s[1..end];
    let decoded = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = body.strip_prefix('#')?;
            let value = if let Some(hex) = code.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                code.parse().ok()?
            };
            char::from_u32(value)?
        }
    };
    Some((decoded, end + 1))
}
