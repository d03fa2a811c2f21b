//! Dub-wiki cast scraper.
//!
//! Fetches supplemental dubbed-cast data from the Portuguese dub wiki:
//! a season page carries the cast table, an actor page the personal
//! details. Only the `dubdb` binary drives this; the organize flow reads
//! the results from the local store.

use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const DEFAULT_BASE_URL: &str = "https://wikidobragens.fandom.com";

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.+\)").expect("parenthetical pattern must compile"));
static PHOTO_SCALE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"scale-to-width-down/\d+").expect("photo scale pattern must compile"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("selector must parse")
}

/// A scraped actor page.
#[derive(Debug, Clone, Default)]
pub struct ScrapedActor {
    pub name: String,
    pub full_name: Option<String>,
    /// Birth date normalized to `YYYY-MM-DD` when parseable.
    pub birth_date: Option<String>,
    pub birth_year: Option<i32>,
    pub birth_place: Option<String>,
    pub known_for: Option<String>,
    pub photo_url: Option<String>,
    pub biography: Option<String>,
}

/// One row of a season's cast table.
#[derive(Debug, Clone)]
pub struct ScrapedCastEntry {
    pub name: String,
    pub role: String,
    /// Absolute URL of the actor's own page, when linked.
    pub url: Option<String>,
}

/// A scraped season page.
#[derive(Debug, Clone, Default)]
pub struct ScrapedSeason {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub cast: Vec<ScrapedCastEntry>,
}

/// Scraper for the dub wiki.
pub struct CastScraper {
    client: reqwest::Client,
    base_url: String,
}

impl CastScraper {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(crate::Error::ScrapeError(format!(
                "HTTP {} for {url}",
                response.status().as_u16()
            )));
        }
        Ok(response.text().await?)
    }

    /// Scrape a season page: title, synopsis, and the dub cast table.
    pub async fn scrape_season(&self, url: &str) -> Result<ScrapedSeason> {
        let body = self.fetch(url).await?;
        Ok(self.parse_season(&body))
    }

    fn parse_season(&self, body: &str) -> ScrapedSeason {
        let document = Html::parse_document(body);
        let mut season = ScrapedSeason::default();

        if let Some(heading) = document.select(&selector("h1#firstHeading")).next() {
            season.title = Some(collect_text(&heading));
        }

        // Synopsis row: the table row labelled "Sinopse" followed by the
        // row holding the text.
        let tr_selector = selector("tr");
        let mut rows = document.select(&tr_selector);
        while let Some(row) = rows.next() {
            if collect_text(&row) == "Sinopse" {
                if let Some(next) = rows.next() {
                    season.overview = Some(collect_text(&next));
                }
                break;
            }
        }

        season.cast = self.parse_cast_table(&document);
        season
    }

    /// The cast table sits after the dub-cast section heading. Role cells
    /// can be merged across rows (rowspan), so a row with a single actor
    /// column inherits the previous role.
    fn parse_cast_table(&self, document: &Html) -> Vec<ScrapedCastEntry> {
        let Some(span) = document
            .select(&selector(r#"span[id="Versão_Portuguesa"]"#))
            .next()
        else {
            return Vec::new();
        };
        let Some(heading) = span.parent().and_then(ElementRef::wrap) else {
            return Vec::new();
        };

        let Some(table) = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| {
                el.value().name() == "table"
                    && el.value().classes().any(|c| c == "article-table")
            })
        else {
            return Vec::new();
        };

        let td_selector = selector("td");
        let mut cast = Vec::new();
        let mut role = String::new();

        for row in table.select(&selector("tr")).skip(1) {
            let columns: Vec<ElementRef> = row.select(&td_selector).collect();

            let actor_column = match columns.len() {
                0 => continue,
                1 => {
                    // Merged role cell: a th sibling names the role, else
                    // the previous row's role carries over.
                    if let Some(th) = row.select(&selector("th")).next() {
                        role = collect_text(&th);
                    }
                    columns[0]
                }
                _ => {
                    role = collect_text(&columns[0]);
                    columns[1]
                }
            };

            if let Some(entry) = self.parse_actor_column(&actor_column, &role) {
                cast.push(entry);
            }
        }

        cast
    }

    fn parse_actor_column(&self, column: &ElementRef, role: &str) -> Option<ScrapedCastEntry> {
        let raw = collect_text(column);
        if raw.is_empty() || raw == "—" {
            return None;
        }

        let name = PARENTHETICAL.replace_all(&raw, "").trim().to_string();
        if name.is_empty() || name == "N/A" || name == "N/D" {
            return None;
        }

        let url = column
            .select(&selector("a"))
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| format!("{}{href}", self.base_url));

        Some(ScrapedCastEntry {
            name,
            role: role.to_string(),
            url,
        })
    }

    /// Scrape an actor page: infobox details and biography.
    pub async fn scrape_actor(&self, url: &str) -> Result<ScrapedActor> {
        let body = self.fetch(url).await?;
        self.parse_actor(&body)
            .ok_or_else(|| crate::Error::ScrapeError(format!("no actor infobox at {url}")))
    }

    fn parse_actor(&self, body: &str) -> Option<ScrapedActor> {
        let document = Html::parse_document(body);
        let infobox = document.select(&selector("aside.portable-infobox")).next()?;

        let name = infobox
            .select(&selector("h2.pi-title"))
            .next()
            .map(|el| collect_text(&el))?;
        if name.is_empty() {
            return None;
        }

        let mut actor = ScrapedActor {
            name,
            ..Default::default()
        };

        actor.full_name = infobox_value(&infobox, "nome");
        actor.birth_place = infobox_value(&infobox, "naturalidade");
        actor.known_for = infobox_value(&infobox, "reconhecimento");

        if let Some(raw) = infobox_value(&infobox, "nascimento") {
            // Drop the "(age)" tail before parsing.
            let cleaned = raw.split('(').next().unwrap_or(&raw).trim().to_string();
            match parse_portuguese_date(&cleaned) {
                Some((date, year)) => {
                    actor.birth_date = Some(date);
                    actor.birth_year = Some(year);
                }
                None => actor.birth_date = Some(cleaned),
            }
        }

        if let Some(img) = infobox
            .select(&selector(r#"figure[data-source="image"] img"#))
            .next()
        {
            if let Some(src) = img.value().attr("src") {
                let src = src.replace("&amp;", "&");
                actor.photo_url =
                    Some(PHOTO_SCALE.replace(&src, "scale-to-width-down/1000").into_owned());
            }
        }

        actor.biography = parse_biography(&document);

        Some(actor)
    }
}

impl Default for CastScraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Paragraphs between the biography heading and the next section heading.
fn parse_biography(document: &Html) -> Option<String> {
    let span = document.select(&selector("span#Biografia")).next()?;
    let heading = span.parent().and_then(ElementRef::wrap)?;

    let mut paragraphs = Vec::new();
    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        match sibling.value().name() {
            "h2" => break,
            "p" => paragraphs.push(collect_text(&sibling)),
            _ => {}
        }
    }

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}

/// Value of an infobox field keyed by its data-source attribute.
fn infobox_value(infobox: &ElementRef, source: &str) -> Option<String> {
    let field = infobox
        .select(&selector(&format!(r#"div[data-source="{source}"]"#)))
        .next()?;
    let value = field.select(&selector("div.pi-data-value")).next()?;
    let text = collect_text(&value);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn collect_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a Portuguese long date ("3 de janeiro de 1980") to `YYYY-MM-DD`.
fn parse_portuguese_date(text: &str) -> Option<(String, i32)> {
    const MONTHS: &[&str] = &[
        "janeiro",
        "fevereiro",
        "março",
        "abril",
        "maio",
        "junho",
        "julho",
        "agosto",
        "setembro",
        "outubro",
        "novembro",
        "dezembro",
    ];

    let parts: Vec<&str> = text.split(" de ").collect();
    if parts.len() != 3 {
        return None;
    }

    let day: u32 = parts[0].trim().parse().ok()?;
    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(parts[1].trim()))?
        + 1;
    let year: i32 = parts[2].trim().parse().ok()?;

    if day == 0 || day > 31 {
        return None;
    }

    Some((format!("{year:04}-{month:02}-{day:02}"), year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_portuguese_date() {
        assert_eq!(
            parse_portuguese_date("3 de janeiro de 1980"),
            Some(("1980-01-03".to_string(), 1980))
        );
        assert_eq!(
            parse_portuguese_date("15 de Dezembro de 1975"),
            Some(("1975-12-15".to_string(), 1975))
        );
        assert_eq!(parse_portuguese_date("não se sabe"), None);
    }

    #[test]
    fn test_parse_season_cast_table() {
        let html = r#"
        <html><body>
          <h1 id="firstHeading">A Minha Série</h1>
          <table><tr><td>Sinopse</td></tr><tr><td>Uma história.</td></tr></table>
          <h2><span id="Versão_Portuguesa">Versão Portuguesa</span></h2>
          <table class="article-table">
            <tr><th>Personagem</th><th>Ator</th></tr>
            <tr><td>Hero</td><td><a href="/wiki/Ana">Ana Silva</a></td></tr>
            <tr><td>Villain</td><td>Rui Costa (voz)</td></tr>
            <tr><td>—</td><td>N/A</td></tr>
          </table>
        </body></html>"#;

        let scraper = CastScraper::with_base_url("https://example.org");
        let season = scraper.parse_season(html);

        assert_eq!(season.title.as_deref(), Some("A Minha Série"));
        assert_eq!(season.overview.as_deref(), Some("Uma história."));
        assert_eq!(season.cast.len(), 2);
        assert_eq!(season.cast[0].name, "Ana Silva");
        assert_eq!(season.cast[0].role, "Hero");
        assert_eq!(
            season.cast[0].url.as_deref(),
            Some("https://example.org/wiki/Ana")
        );
        assert_eq!(season.cast[1].name, "Rui Costa");
        assert!(season.cast[1].url.is_none());
    }

    #[test]
    fn test_parse_season_merged_role_rows() {
        let html = r#"
        <html><body>
          <h2><span id="Versão_Portuguesa">Versão Portuguesa</span></h2>
          <table class="article-table">
            <tr><th>Personagem</th><th>Ator</th></tr>
            <tr><td>Hero</td><td>Ana Silva</td></tr>
            <tr><td>Rui Costa</td></tr>
          </table>
        </body></html>"#;

        let scraper = CastScraper::with_base_url("https://example.org");
        let season = scraper.parse_season(html);

        assert_eq!(season.cast.len(), 2);
        assert_eq!(season.cast[1].name, "Rui Costa");
        assert_eq!(season.cast[1].role, "Hero");
    }

    #[test]
    fn test_parse_actor_infobox() {
        let html = r#"
        <html><body>
          <aside class="portable-infobox">
            <h2 class="pi-title">Ana Silva</h2>
            <figure data-source="image"><img src="https://img/x/scale-to-width-down/150?cb=1"></figure>
            <div data-source="nome"><div class="pi-data-value">Ana Maria Silva</div></div>
            <div data-source="naturalidade"><div class="pi-data-value">Lisboa</div></div>
            <div data-source="nascimento"><div class="pi-data-value">3 de janeiro de 1980 (44 anos)</div></div>
          </aside>
          <h2><span id="Biografia">Biografia</span></h2>
          <p>Primeira linha.</p>
          <p>Segunda linha.</p>
          <h2>Outra secção</h2>
          <p>Ignorada.</p>
        </body></html>"#;

        let scraper = CastScraper::with_base_url("https://example.org");
        let actor = scraper.parse_actor(html).unwrap();

        assert_eq!(actor.name, "Ana Silva");
        assert_eq!(actor.full_name.as_deref(), Some("Ana Maria Silva"));
        assert_eq!(actor.birth_place.as_deref(), Some("Lisboa"));
        assert_eq!(actor.birth_date.as_deref(), Some("1980-01-03"));
        assert_eq!(actor.birth_year, Some(1980));
        assert_eq!(
            actor.photo_url.as_deref(),
            Some("https://img/x/scale-to-width-down/1000?cb=1")
        );
        assert_eq!(
            actor.biography.as_deref(),
            Some("Primeira linha.\nSegunda linha.")
        );
    }
}
