use cas_ads::AdRecord;

const AD_PAGE: &str = r#"
<html><body>
  <h1 id="rbt-ad-title">  BMW 320d   Touring </h1>
  <div class="cBox-body cBox-body--technical-data">
    <div class="g-col-6 vip-price-rating__tech-details">
      12.345 €
      <span>Brutto</span>
    </div>
    <div class="g-row u-margin-bottom-9">
      <div class="g-col-6">Kilometerstand</div>
      <div class="g-col-6">  98.000 km </div>
    </div>
    <div class="g-row u-margin-bottom-9">
      <div class="g-col-6">Kraftstoffart</div>
      <div class="g-col-6">Diesel</div>
    </div>
    <div class="g-row u-margin-bottom-9">
      <div class="g-col-6">Incomplete</div>
    </div>
  </div>
  <div id="rbt-features">
    <div class="g-col-6">ABS</div>
    <div class="g-col-6">
      Navigationssystem
    </div>
    <div class="g-col-6">   </div>
  </div>
  <p id="rbt-seller-address">DE-10115
    Berlin</p>
</body></html>
"#;

#[test]
fn parse_full_ad() {
    let record = AdRecord::parse(AD_PAGE, "123").unwrap();

    assert_eq!(record.id, "123");
    assert_eq!(record.url, None);
    assert_eq!(record.title.as_deref(), Some("BMW 320d Touring"));
    assert_eq!(record.location.as_deref(), Some("DE-10115 Berlin"));
    assert_eq!(
        record.features,
        Some(vec!["ABS".to_string(), "Navigationssystem".to_string()])
    );

    let data = record.technical_data.as_ref().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data["price"], "12.345");
    assert_eq!(data["Kilometerstand"], "98.000 km");
    assert_eq!(data["Kraftstoffart"], "Diesel");

    assert_eq!(record.price(), Some(12345));
}

#[test]
fn ambiguous_price_is_left_out() {
    let page = r#"
    <div class="cBox-body cBox-body--technical-data">
      <div class="g-col-6 vip-price-rating__tech-details">1.000 €</div>
      <div class="g-col-6 vip-price-rating__tech-details">2.000 €</div>
      <div class="g-row u-margin-bottom-9">
        <div class="g-col-6">Getriebe</div>
        <div class="g-col-6">Automatik</div>
      </div>
    </div>"#;

    let record = AdRecord::parse(page, "7").unwrap();
    let data = record.technical_data.as_ref().unwrap();
    assert!(!data.contains_key("price"));
    assert_eq!(data["Getriebe"], "Automatik");
    assert_eq!(record.price(), None);
    assert_eq!(record.features, None);
    assert_eq!(record.title, None);
}

#[test]
fn features_only() {
    let page = r#"<div id="rbt-features"><div class="g-col-6">Klimaanlage</div></div>"#;

    let record = AdRecord::parse(page, "8").unwrap();
    assert_eq!(record.technical_data, None);
    assert_eq!(record.features, Some(vec!["Klimaanlage".to_string()]));
}

#[test]
fn page_without_ad_data() {
    let page = "<html><body><h1>Zugriff verweigert</h1></body></html>";
    assert_eq!(AdRecord::parse(page, "9"), None);
}

#[test]
fn serialized_field_names() {
    let record = AdRecord::parse(AD_PAGE, "123")
        .unwrap()
        .with_url("https://suchen.mobile.de/fahrzeuge/details.html?id=123");
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["id"], "123");
    assert_eq!(
        json["url"],
        "https://suchen.mobile.de/fahrzeuge/details.html?id=123"
    );
    assert_eq!(json["rbt_features"][0], "ABS");
    assert_eq!(json["technical_data"]["price"], "12.345");
    assert_eq!(json["loc"], "DE-10115 Berlin");
    assert!(json.get("scraped_at").is_some());

    let without_url = serde_json::to_value(AdRecord::parse(AD_PAGE, "123").unwrap()).unwrap();
    assert!(without_url.get("url").is_none());
}
