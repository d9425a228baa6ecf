use cas_search::{
    make_filter, page_url, Bounds, Country, MakeFilter, ModelCode, PriceRange, SearchQuery,
    SellerType, DEFAULT_SEARCH_URL,
};

#[test]
fn default_query_is_base_url() {
    assert_eq!(DEFAULT_SEARCH_URL, SearchQuery::default().url());
}

#[test]
fn parameters_order() {
    let query = SearchQuery {
        seller_type: Some(SellerType::Private),
        country: Some(Country::Germany),
        price: Bounds::new(Some(1000), Some(5000)),
        power: Bounds::new(Some(90), Some(150)),
        first_registration: Bounds::new(Some(2012), Some(2018)),
        mileage: Bounds::new(None, Some(150_000)),
        make: Some(MakeFilter {
            brand: 1900,
            model: Some(ModelCode::Model(9)),
        }),
        ..Default::default()
    };

    let expected = format!(
        "{DEFAULT_SEARCH_URL}\
         &minPowerAsArray=90&minPowerAsArray=PS\
         &maxPowerAsArray=150&maxPowerAsArray=PS\
         &minPrice=1000&maxPrice=5000\
         &minFirstRegistrationDate=2012&maxFirstRegistrationDate=2018\
         &maxMileage=150000\
         &ce=DE\
         &adLimitation=ONLY_FSBO_ADS\
         &ms=1900;9"
    );
    assert_eq!(expected, query.url());
}

#[test]
fn zero_bound_is_emitted() {
    let query = SearchQuery {
        price: Bounds::new(Some(0), None),
        ..Default::default()
    };
    assert!(query.url().ends_with("&minPrice=0"));
}

#[test]
fn base_url_without_query_string() {
    let query = SearchQuery {
        base_url: "https://example.com/search.html".into(),
        seller_type: Some(SellerType::Dealer),
        ..Default::default()
    };
    assert_eq!(
        "https://example.com/search.html?adLimitation=ONLY_DEALER_ADS",
        query.url()
    );
}

#[test]
fn make_model_formats() {
    let brand_only = make_filter("volkswagen", None).unwrap();
    assert_eq!("25200", brand_only.to_string());

    let series = make_filter("BMW", Some("series 3")).unwrap();
    assert_eq!("3500;;21", series.to_string());

    let variant = make_filter("bmw", Some("320 Gran Turismo")).unwrap();
    assert_eq!("3500;76", variant.to_string());
}

#[test]
fn with_price_replaces_bounds() {
    let query = SearchQuery {
        price: Bounds::new(Some(10), None),
        mileage: Bounds::new(Some(5), Some(10)),
        ..Default::default()
    };
    let sliced = query.with_price(PriceRange::new(101, 200));
    assert_eq!(Bounds::new(Some(101), Some(200)), sliced.price);
    assert_eq!(query.mileage, sliced.mileage);
}

#[test]
fn page_number() {
    assert_eq!(
        "https://x.de/s?a=1&pageNumber=3",
        page_url("https://x.de/s?a=1", 3)
    );
}
