//! HTML rendering of catalog pages
//!
//! Markup is produced with quick-xml so element nesting and attribute quoting
//! are always well formed. Values that went through form sanitization are
//! stored already escaped and are written verbatim; everything else is
//! escaped here.

use axum::http::StatusCode;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::{Renderer, View};
use crate::{
    error::{AppError, AppResult},
    forms::FieldError,
    models::{BookInstance, BookInstanceDraft, BookInstanceStatus, BookSummary, Genre, GenreDraft},
};

type XmlResult = Result<(), quick_xml::Error>;

/// Text content, either raw or already HTML-escaped
#[derive(Clone, Copy)]
enum Text<'a> {
    Plain(&'a str),
    Escaped(&'a str),
}

struct Page {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl Page {
    fn new() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    fn start(&mut self, tag: &str, attrs: &[(&str, &str)]) -> XmlResult {
        let mut elem = BytesStart::new(tag);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn end(&mut self, tag: &str) -> XmlResult {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn text(&mut self, text: Text<'_>) -> XmlResult {
        let event = match text {
            Text::Plain(s) => BytesText::new(s),
            Text::Escaped(s) => BytesText::from_escaped(s),
        };
        self.writer.write_event(Event::Text(event))?;
        Ok(())
    }

    fn element(&mut self, tag: &str, text: Text<'_>) -> XmlResult {
        self.start(tag, &[])?;
        self.text(text)?;
        self.end(tag)
    }

    fn link(&mut self, href: &str, text: Text<'_>) -> XmlResult {
        self.start("a", &[("href", href)])?;
        self.text(text)?;
        self.end("a")
    }

    /// `<input>` whose value may already be escaped
    fn input(&mut self, kind: &str, name: &str, value: Text<'_>, required: bool) -> XmlResult {
        let mut elem = BytesStart::new("input");
        elem.push_attribute(("type", kind));
        elem.push_attribute(("id", name));
        elem.push_attribute(("name", name));
        match value {
            Text::Plain(v) => elem.push_attribute(("value", v)),
            Text::Escaped(v) => elem.push_attribute((&b"value"[..], v.as_bytes())),
        }
        if required {
            elem.push_attribute(("required", "required"));
        }
        self.writer.write_event(Event::Empty(elem))?;
        Ok(())
    }

    fn label(&mut self, for_field: &str, text: &str) -> XmlResult {
        self.start("label", &[("for", for_field)])?;
        self.text(Text::Plain(text))?;
        self.end("label")
    }

    fn option(&mut self, value: &str, label: &str, selected: bool) -> XmlResult {
        let mut elem = BytesStart::new("option");
        elem.push_attribute(("value", value));
        if selected {
            elem.push_attribute(("selected", "selected"));
        }
        self.writer.write_event(Event::Start(elem))?;
        self.text(Text::Plain(label))?;
        self.end("option")
    }

    fn submit(&mut self, label: &str) -> XmlResult {
        self.start("button", &[("type", "submit")])?;
        self.text(Text::Plain(label))?;
        self.end("button")
    }

    fn errors(&mut self, errors: &[FieldError]) -> XmlResult {
        if errors.is_empty() {
            return Ok(());
        }
        self.start("ul", &[("class", "errors")])?;
        for err in errors {
            self.element("li", Text::Plain(&err.message))?;
        }
        self.end("ul")
    }

    fn finish(self) -> AppResult<String> {
        let bytes = self.writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| AppError::Render(e.to_string()))
    }
}

/// Wrap page content in the shared document layout
fn layout<F>(title: &str, body: F) -> AppResult<String>
where
    F: FnOnce(&mut Page) -> XmlResult,
{
    let mut page = Page::new();
    write_document(&mut page, title, body)?;
    page.finish()
}

fn write_document<F>(page: &mut Page, title: &str, body: F) -> XmlResult
where
    F: FnOnce(&mut Page) -> XmlResult,
{
    page.writer
        .write_event(Event::DocType(BytesText::from_escaped("html")))?;
    page.start("html", &[("lang", "en")])?;
    page.start("head", &[])?;
    let mut meta = BytesStart::new("meta");
    meta.push_attribute(("charset", "utf-8"));
    page.writer.write_event(Event::Empty(meta))?;
    page.element("title", Text::Plain(title))?;
    page.end("head")?;
    page.start("body", &[])?;

    page.start("nav", &[])?;
    page.start("ul", &[])?;
    for (href, label) in [
        ("/catalog/genres", "All genres"),
        ("/catalog/bookinstances", "All book-instances"),
        ("/catalog/genre/create", "Create new genre"),
        ("/catalog/bookinstance/create", "Create new book instance (copy)"),
    ] {
        page.start("li", &[])?;
        page.link(href, Text::Plain(label))?;
        page.end("li")?;
    }
    page.end("ul")?;
    page.end("nav")?;

    page.start("main", &[])?;
    body(page)?;
    page.end("main")?;
    page.end("body")?;
    page.end("html")
}

/// Default renderer producing HTML5 documents
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, view: &View) -> AppResult<String> {
        let title = view.title();
        match view {
            View::GenreList { genres } => layout(&title, |p| genre_list(p, &title, genres)),
            View::GenreDetail { genre, books } => {
                layout(&title, |p| genre_detail(p, &title, genre, books))
            }
            View::GenreForm {
                title: heading,
                genre,
                errors,
            } => layout(&title, |p| genre_form(p, heading, genre.as_ref(), errors)),
            View::GenreDelete { genre, books } => {
                layout(&title, |p| genre_delete(p, &title, genre.as_ref(), books))
            }
            View::BookInstanceList { instances } => {
                layout(&title, |p| book_instance_list(p, &title, instances))
            }
            View::BookInstanceDetail { instance } => {
                layout(&title, |p| book_instance_detail(p, &title, instance))
            }
            View::BookInstanceForm {
                title: heading,
                books,
                selected_book,
                instance,
                statuses,
                errors,
            } => layout(&title, |p| {
                book_instance_form(
                    p,
                    heading,
                    books,
                    selected_book.as_deref(),
                    instance.as_ref(),
                    statuses,
                    errors,
                )
            }),
            View::BookInstanceDelete { instance } => {
                layout(&title, |p| book_instance_delete(p, &title, instance))
            }
        }
    }
}

fn genre_list(p: &mut Page, title: &str, genres: &[Genre]) -> XmlResult {
    p.element("h1", Text::Plain(title))?;
    if genres.is_empty() {
        return p.element("p", Text::Plain("There are no genres."));
    }
    p.start("ul", &[])?;
    for genre in genres {
        p.start("li", &[])?;
        p.link(&genre.url(), Text::Escaped(&genre.name))?;
        p.end("li")?;
    }
    p.end("ul")
}

fn book_list(p: &mut Page, books: &[BookSummary]) -> XmlResult {
    p.start("dl", &[])?;
    for book in books {
        p.start("dt", &[])?;
        p.link(&book.url(), Text::Plain(&book.title))?;
        p.end("dt")?;
    }
    p.end("dl")
}

fn genre_detail(p: &mut Page, title: &str, genre: &Genre, books: &[BookSummary]) -> XmlResult {
    p.element("h1", Text::Plain(title))?;
    p.start("h2", &[])?;
    p.text(Text::Plain("Genre: "))?;
    p.text(Text::Escaped(&genre.name))?;
    p.end("h2")?;
    p.element("h3", Text::Plain("Books"))?;
    if books.is_empty() {
        p.element("p", Text::Plain("This genre has no books."))?;
    } else {
        book_list(p, books)?;
    }
    p.start("p", &[])?;
    p.link(&format!("{}/delete", genre.url()), Text::Plain("Delete genre"))?;
    p.text(Text::Plain(" | "))?;
    p.link(&format!("{}/update", genre.url()), Text::Plain("Update genre"))?;
    p.end("p")
}

fn genre_form(
    p: &mut Page,
    heading: &str,
    genre: Option<&GenreDraft>,
    errors: &[FieldError],
) -> XmlResult {
    p.element("h1", Text::Plain(heading))?;
    p.start("form", &[("method", "POST"), ("action", "")])?;
    p.start("div", &[("class", "form-group")])?;
    p.label("name", "Genre:")?;
    let name = genre.map(|g| g.name.as_str()).unwrap_or_default();
    p.input("text", "name", Text::Escaped(name), true)?;
    p.end("div")?;
    p.submit("Submit")?;
    p.end("form")?;
    p.errors(errors)
}

fn genre_delete(
    p: &mut Page,
    title: &str,
    genre: Option<&Genre>,
    books: &[BookSummary],
) -> XmlResult {
    p.element("h1", Text::Plain(title))?;
    if let Some(genre) = genre {
        p.start("h2", &[])?;
        p.text(Text::Plain("Genre: "))?;
        p.text(Text::Escaped(&genre.name))?;
        p.end("h2")?;
    }
    if !books.is_empty() {
        p.element(
            "p",
            Text::Plain("Delete the following books before attempting to delete this genre."),
        )?;
        p.element("h4", Text::Plain("Books"))?;
        return book_list(p, books);
    }
    p.element("p", Text::Plain("Do you really want to delete this Genre?"))?;
    p.start("form", &[("method", "POST"), ("action", "")])?;
    if let Some(genre) = genre {
        p.input("hidden", "genreid", Text::Plain(genre.id.as_str()), true)?;
    }
    p.submit("Delete")?;
    p.end("form")
}

fn book_instance_list(p: &mut Page, title: &str, instances: &[BookInstance]) -> XmlResult {
    p.element("h1", Text::Plain(title))?;
    if instances.is_empty() {
        return p.element("p", Text::Plain("There are no book copies in this library."));
    }
    p.start("ul", &[])?;
    for instance in instances {
        p.start("li", &[])?;
        p.start("a", &[("href", instance.url().as_str())])?;
        p.text(Text::Plain(instance.book_title.as_deref().unwrap_or_default()))?;
        p.text(Text::Plain(" : "))?;
        p.text(Text::Escaped(&instance.imprint))?;
        p.end("a")?;
        p.text(Text::Plain(" - "))?;
        status_badge(p, instance)?;
        p.end("li")?;
    }
    p.end("ul")
}

fn status_badge(p: &mut Page, instance: &BookInstance) -> XmlResult {
    let class = match instance.status {
        BookInstanceStatus::Available => "text-success",
        BookInstanceStatus::Maintenance => "text-danger",
        BookInstanceStatus::Loaned | BookInstanceStatus::Reserved => "text-warning",
    };
    p.start("span", &[("class", class)])?;
    p.text(Text::Plain(instance.status.as_str()))?;
    p.end("span")?;
    if instance.status != BookInstanceStatus::Available {
        if let Some(due) = instance.due_back_formatted() {
            p.start("span", &[])?;
            p.text(Text::Plain(" (Due: "))?;
            p.text(Text::Plain(&due))?;
            p.text(Text::Plain(")"))?;
            p.end("span")?;
        }
    }
    Ok(())
}

fn book_instance_fields(p: &mut Page, instance: &BookInstance) -> XmlResult {
    p.start("p", &[])?;
    p.element("strong", Text::Plain("Title: "))?;
    p.link(
        &format!("/catalog/book/{}", instance.book),
        Text::Plain(instance.book_title.as_deref().unwrap_or_default()),
    )?;
    p.end("p")?;
    p.start("p", &[])?;
    p.element("strong", Text::Plain("Imprint: "))?;
    p.text(Text::Escaped(&instance.imprint))?;
    p.end("p")?;
    p.start("p", &[])?;
    p.element("strong", Text::Plain("Status: "))?;
    status_badge(p, instance)?;
    p.end("p")
}

fn book_instance_detail(p: &mut Page, title: &str, instance: &BookInstance) -> XmlResult {
    p.start("h1", &[])?;
    p.text(Text::Plain("ID: "))?;
    p.text(Text::Plain(instance.id.as_str()))?;
    p.end("h1")?;
    p.element("h2", Text::Plain(title))?;
    book_instance_fields(p, instance)?;
    p.start("p", &[])?;
    p.link(&format!("{}/delete", instance.url()), Text::Plain("Delete BookInstance"))?;
    p.text(Text::Plain(" | "))?;
    p.link(&format!("{}/update", instance.url()), Text::Plain("Update BookInstance"))?;
    p.end("p")
}

#[allow(clippy::too_many_arguments)]
fn book_instance_form(
    p: &mut Page,
    heading: &str,
    books: &[BookSummary],
    selected_book: Option<&str>,
    instance: Option<&BookInstanceDraft>,
    statuses: &[BookInstanceStatus],
    errors: &[FieldError],
) -> XmlResult {
    p.element("h1", Text::Plain(heading))?;
    p.start("form", &[("method", "POST"), ("action", "")])?;

    p.start("div", &[("class", "form-group")])?;
    p.label("book", "Book:")?;
    p.start("select", &[("id", "book"), ("name", "book"), ("required", "required")])?;
    for book in books {
        let selected = selected_book == Some(book.id.as_str());
        p.option(book.id.as_str(), &book.title, selected)?;
    }
    p.end("select")?;
    p.end("div")?;

    p.start("div", &[("class", "form-group")])?;
    p.label("imprint", "Imprint:")?;
    let imprint = instance.map(|i| i.imprint.as_str()).unwrap_or_default();
    p.input("text", "imprint", Text::Escaped(imprint), true)?;
    p.end("div")?;

    p.start("div", &[("class", "form-group")])?;
    p.label("due_back", "Date when book available:")?;
    let due_back = instance.map(|i| i.due_back.as_str()).unwrap_or_default();
    p.input("date", "due_back", Text::Escaped(due_back), false)?;
    p.end("div")?;

    p.start("div", &[("class", "form-group")])?;
    p.label("status", "Status:")?;
    p.start("select", &[("id", "status"), ("name", "status"), ("required", "required")])?;
    let current = instance.map(|i| i.status.as_str()).unwrap_or_default();
    for status in statuses {
        p.option(status.as_str(), status.as_str(), current == status.as_str())?;
    }
    p.end("select")?;
    p.end("div")?;

    p.submit("Submit")?;
    p.end("form")?;
    p.errors(errors)
}

fn book_instance_delete(p: &mut Page, title: &str, instance: &BookInstance) -> XmlResult {
    p.element("h1", Text::Plain(title))?;
    book_instance_fields(p, instance)?;
    p.element("p", Text::Plain("Do you really want to delete this BookInstance?"))?;
    p.start("form", &[("method", "POST"), ("action", "")])?;
    p.input("hidden", "bookinstanceid", Text::Plain(instance.id.as_str()), true)?;
    p.submit("Delete")?;
    p.end("form")
}

/// Generic failure page; falls back to plain text if markup cannot be built
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status
        .canonical_reason()
        .map(|reason| format!("{} {}", status.as_u16(), reason))
        .unwrap_or_else(|| status.as_u16().to_string());
    layout(&title, |p| {
        p.element("h1", Text::Plain(&title))?;
        p.element("p", Text::Plain(message))
    })
    .unwrap_or_else(|_| format!("{}: {}", title, message))
}
