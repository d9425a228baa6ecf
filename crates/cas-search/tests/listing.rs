use cas_search::{ad_id, clean_text, unique_ads, SearchPage};

const RESULTS_PAGE: &str = r#"
<html><body>
  <h1 class="h2 u-text-orange rbt-result-list-headline">1.234 Angebote für Audi A4</h1>
  <div class="cBox-body">
    <a class="link--muted no--text--decoration result-item"
       href="https://suchen.mobile.de/fahrzeuge/details.html?id=111&amp;damageUnrepaired=NO_DAMAGE_UNREPAIRED">A4</a>
    <a class="link--muted no--text--decoration result-item"
       href="https://suchen.mobile.de/fahrzeuge/details.html?id=222">A4 Avant</a>
    <a class="link--muted no--text--decoration result-item"
       href="https://ads.example.com/sponsored?id=333">Sponsored</a>
    <a class="link--muted" href="https://suchen.mobile.de/fahrzeuge/details.html?id=444">Other</a>
  </div>
  <ul class="pagination">
    <li><span class="btn btn--muted btn--s">1</span></li>
    <li><span class="btn btn--muted btn--s">2</span></li>
    <li><span class="btn btn--muted btn--s">17</span></li>
    <li><span class="btn btn--muted btn--s">Weiter</span></li>
  </ul>
</body></html>
"#;

#[test]
fn parse_results_page() {
    let page = SearchPage::parse(RESULTS_PAGE);
    assert_eq!(Some(1234), page.result_count);
    assert_eq!(17, page.last_page);
    assert_eq!(
        vec![
            "https://suchen.mobile.de/fahrzeuge/details.html?id=111&damageUnrepaired=NO_DAMAGE_UNREPAIRED",
            "https://suchen.mobile.de/fahrzeuge/details.html?id=222",
        ],
        page.ad_links
    );
}

#[test]
fn parse_empty_page() {
    let page = SearchPage::parse("<html><body><p>Zugriff verweigert</p></body></html>");
    assert_eq!(None, page.result_count);
    assert_eq!(1, page.last_page);
    assert!(page.ad_links.is_empty());
}

#[test]
fn ad_id_exact_key() {
    assert_eq!(
        Some("123"),
        ad_id("https://suchen.mobile.de/details.html?id=123&ref=srp")
    );
    assert_eq!(
        Some("42"),
        ad_id("https://suchen.mobile.de/details.html?customerId=9&id=42#gallery")
    );
    assert_eq!(None, ad_id("https://suchen.mobile.de/details.html?customerId=9"));
    assert_eq!(None, ad_id("https://suchen.mobile.de/details.html"));
    assert_eq!(None, ad_id("https://suchen.mobile.de/details.html?id="));
}

#[test]
fn unique_ads_keeps_first_seen() {
    let urls = [
        "https://suchen.mobile.de/d.html?id=2&pos=1",
        "https://suchen.mobile.de/d.html?id=1",
        "https://suchen.mobile.de/d.html?id=2&pos=7",
        "https://suchen.mobile.de/d.html?ref=none",
        "https://suchen.mobile.de/d.html?id=12",
    ];
    assert_eq!(
        vec![
            "https://suchen.mobile.de/d.html?id=2&pos=1",
            "https://suchen.mobile.de/d.html?id=1",
            "https://suchen.mobile.de/d.html?id=12",
        ],
        unique_ads(&urls)
    );
}

#[test]
fn clean_text_collapses_whitespace() {
    assert_eq!("12.345 €", clean_text("\n   12.345\u{a0}€  \n"));
}
