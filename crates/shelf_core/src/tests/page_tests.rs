use super::*;

const SHELF_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>TV Titles</title></head>
<body>
  <form action="/search/" method="get">
    <input type="search" name="q" placeholder="Search titles">
  </form>

  <div class="main-content" data-title="Archer" data-video-type="TV" data-update-url="/update/">
    <div class="title-image">
      <img src="/static/shelf/img/archer.jpg" height="220" alt="Archer">
    </div>
    <div class="title-rating"><p>8.0/10 - Archer</p></div>
    <div class="blurb"><p>Covert black ops and espionage take a back seat.</p></div>
  </div>
  <div class="find-results hidden">
    <ul>
      <li><a href="https://www.imdb.com/title/tt1486217/">Archer (2009) (TV Series)</a></li>
      <li><a href="https://www.imdb.com/title/tt0060490/">Archer (1966)</a> from the title search</li>
      <li>entry without any link</li>
    </ul>
  </div>

  <div class="main-content" data-title="Lodge 49" data-video-type="TV" data-update-url="/update/">
    <div class="title-rating"><p>7.9/10 - Lodge 49</p></div>
    <div class="blurb"><p>A disarmingly optimistic ex-surfer drifts into a fraternal lodge.</p></div>
  </div>
  <div class="find-results hidden">
    <ul></ul>
  </div>

  <div class="main-content" data-title="Heat" data-video-type="MO" data-update-url="/update/">
    <div class="title-image">
      <img src="http://art.example/heat.jpg" alt="Heat">
    </div>
    <div class="title-rating"><p>8.3/10 - Heat</p></div>
    <div class="blurb"><p>A group of high-end professional thieves.</p></div>
  </div>
</body>
</html>"#;

fn page_url() -> Url {
    Url::parse("http://127.0.0.1:8000/tv/").unwrap()
}

fn parsed() -> Shelf {
    parse_shelf(SHELF_PAGE, &page_url(), ShelfSource::tv()).expect("fixture parses")
}

#[test]
fn cards_parse_in_document_order() {
    let shelf = parsed();
    let titles: Vec<&str> = shelf.cards.iter().map(|card| card.title.as_str()).collect();
    assert_eq!(titles, ["Archer", "Lodge 49", "Heat"]);
    assert_eq!(shelf.cards[0].video_type, VideoType::Tv);
    assert_eq!(shelf.cards[2].video_type, VideoType::Movie);
    assert!(shelf
        .cards
        .iter()
        .all(|card| card.update_url == "/update/"));
}

#[test]
fn rating_blurb_and_poster_are_extracted() {
    let shelf = parsed();
    let archer = &shelf.cards[0];
    assert_eq!(archer.rating_line, "8.0/10 - Archer");
    assert_eq!(
        archer.blurb,
        "Covert black ops and espionage take a back seat."
    );
    let poster = archer.poster.as_ref().expect("archer has art");
    assert_eq!(
        poster.src.as_str(),
        "http://127.0.0.1:8000/static/shelf/img/archer.jpg"
    );
    assert_eq!(poster.height, Some(220));
}

#[test]
fn absolute_poster_src_is_kept_and_height_is_optional() {
    let shelf = parsed();
    let heat = &shelf.cards[2];
    let poster = heat.poster.as_ref().expect("heat has art");
    assert_eq!(poster.src.as_str(), "http://art.example/heat.jpg");
    assert_eq!(poster.height, None);
    assert_eq!(shelf.cards[1].poster, None);
}

#[test]
fn candidates_come_from_the_sibling_list() {
    let shelf = parsed();
    let entries = &shelf.cards[0].candidates.entries;
    assert_eq!(entries.len(), 2, "the linkless entry is skipped");
    assert_eq!(entries[0].label, "Archer (2009) (TV Series)");
    assert_eq!(entries[0].url, "https://www.imdb.com/title/tt1486217/");
    assert_eq!(entries[1].label, "Archer (1966)");
    assert_eq!(entries[1].url, "https://www.imdb.com/title/tt0060490/");
}

#[test]
fn lists_start_collapsed_and_unactionable() {
    let shelf = parsed();
    for card in &shelf.cards {
        assert!(!card.candidates.is_visible(), "{}", card.title);
        assert!(!card.candidates.is_actionable(), "{}", card.title);
    }
}

#[test]
fn missing_results_sibling_or_empty_list_mean_no_entries() {
    let shelf = parsed();
    assert!(shelf.cards[1].candidates.entries.is_empty());
    assert!(shelf.cards[2].candidates.entries.is_empty());
}

#[test]
fn relative_candidate_links_resolve_against_the_page() {
    let html = r#"
      <div class="main-content" data-title="T" data-video-type="MO" data-update-url="/update/">
        <div class="title-rating"><p>r</p></div>
      </div>
      <div class="find-results hidden">
        <ul><li><a href="/local/title/1/">Local mirror</a></li></ul>
      </div>"#;
    let shelf = parse_shelf(html, &page_url(), ShelfSource::movies()).unwrap();
    assert_eq!(
        shelf.cards[0].candidates.entries[0].url,
        "http://127.0.0.1:8000/local/title/1/"
    );
}

#[test]
fn missing_data_title_is_an_error() {
    let html = r#"<div class="main-content" data-video-type="TV" data-update-url="/update/"></div>"#;
    match parse_shelf(html, &page_url(), ShelfSource::tv()) {
        Err(PageError::MissingAttr { attr }) => assert_eq!(attr, "data-title"),
        other => panic!("expected missing-attribute error, got {other:?}"),
    }
}

#[test]
fn unknown_video_type_is_an_error() {
    let html =
        r#"<div class="main-content" data-title="T" data-video-type="4K" data-update-url="/update/"></div>"#;
    match parse_shelf(html, &page_url(), ShelfSource::tv()) {
        Err(PageError::BadVideoType { title, .. }) => assert_eq!(title, "T"),
        other => panic!("expected video-type error, got {other:?}"),
    }
}
