use std::fs::{self, File};
use std::io;
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;

use anyhow::Context;
use cas_ads::{scrap_glob, scrap_page, AdScraper, AdScraperConfig, FileMode, Output, RecordSink};
use cas_crawler::{
    crawl_site, gather_ad_urls, plan_searches, CrawlerConfig, Fetch, HttpFetcher, OnError,
    PageLocation, Scrapable, Seed, Throttle,
};
use cas_search::catalog::{ModelKind, BRANDS};
use cas_search::{find_brand, make_filter, unique_ads, Bounds, Country, SearchQuery, SellerType};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use tokio::runtime;

/// Car Ads Scraper for mobile.de
#[derive(Debug, Parser)]
#[command(name = "cas", version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "crawl")]
    Crawl(CrawlArgs),
    #[command(name = "search")]
    Search(SearchArgs),
    #[command(name = "scrap")]
    Scrap(ScrapArgs),
    #[command(name = "brands")]
    Brands(BrandsArgs),
    #[command(hide = true)]
    Completion,
}

/// Search filters
#[derive(Debug, clap::Args)]
pub struct QueryArgs {
    /// Brand name (see `cas brands`) or raw brand code
    #[arg(long)]
    pub brand: Option<String>,
    /// Model, series or variant name of the brand, or raw model code
    #[arg(long, requires = "brand")]
    pub model: Option<String>,
    #[arg(long, value_enum)]
    pub seller_type: Option<SellerType>,
    #[arg(long, value_enum)]
    pub country: Option<Country>,
    /// Override the search page the filters are appended to
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub min_price: Option<u32>,
    #[arg(long)]
    pub max_price: Option<u32>,
    /// Minimum power in PS
    #[arg(long)]
    pub min_power: Option<u32>,
    /// Maximum power in PS
    #[arg(long)]
    pub max_power: Option<u32>,
    /// Minimum first registration year
    #[arg(long)]
    pub min_first_registration: Option<u32>,
    /// Maximum first registration year
    #[arg(long)]
    pub max_first_registration: Option<u32>,
    #[arg(long)]
    pub min_mileage: Option<u32>,
    #[arg(long)]
    pub max_mileage: Option<u32>,
}

impl TryFrom<&QueryArgs> for SearchQuery {
    type Error = anyhow::Error;

    fn try_from(args: &QueryArgs) -> Result<Self, Self::Error> {
        let mut query = SearchQuery {
            seller_type: args.seller_type,
            country: args.country,
            price: Bounds::new(args.min_price, args.max_price),
            power: Bounds::new(args.min_power, args.max_power),
            first_registration: Bounds::new(
                args.min_first_registration,
                args.max_first_registration,
            ),
            mileage: Bounds::new(args.min_mileage, args.max_mileage),
            ..Default::default()
        };
        if let Some(base_url) = &args.base_url {
            query.base_url = base_url.to_string();
        }
        if let Some(brand) = &args.brand {
            query.make = Some(make_filter(brand, args.model.as_deref())?);
        }
        Ok(query)
    }
}

/// Crawler overrides
#[derive(Debug, clap::Args)]
pub struct CrawlerArgs {
    /// Optional default crawler yaml configuration file
    #[arg(env = "CAS_CRAWLER_CONFIG", long)]
    pub crawler_config: Option<PathBuf>,
    /// Override crawler's user agent
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Override crawler's page buffer size
    #[arg(long)]
    pub page_buffer: Option<usize>,
    /// Override crawler's number of CPU workers used to parse pages
    #[arg(long)]
    pub num_workers: Option<usize>,
    /// Throttle to this many concurrent downloads
    #[arg(long, conflicts_with_all = ["per_second", "delay"])]
    pub concurrent: Option<NonZeroUsize>,
    /// Throttle to this many downloads per second
    #[arg(long, conflicts_with = "delay")]
    pub per_second: Option<NonZeroUsize>,
    /// Throttle to one download every given seconds
    #[arg(long)]
    pub delay: Option<f32>,
    /// Override crawler's download error handling strategy
    #[arg(long, value_enum)]
    pub on_dl_error: Option<OnError>,
    /// Override crawler's scrap error handling strategy
    #[arg(long, value_enum)]
    pub on_scrap_error: Option<OnError>,
    /// Override the number of results a single search exposes
    #[arg(long)]
    pub result_cap: Option<u32>,
    /// Override the width in euros of price slices
    #[arg(long)]
    pub slice_width: Option<NonZeroU32>,
    /// Count price slices and bisect those still above the result cap
    #[arg(long)]
    pub refine: bool,
    /// No SIGINT handling, pages already downloaded may be lost
    #[arg(long)]
    pub no_sigint: bool,
}

impl TryFrom<&CrawlerArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlerArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(path) = &args.crawler_config {
            let file = File::open(path)
                .with_context(|| format!("Couldn't open {}", path.display()))?;
            serde_yaml::from_reader(file)
                .with_context(|| format!("Invalid crawler config {}", path.display()))?
        } else {
            CrawlerConfig::default()
        };
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        if let Some(page_buffer) = args.page_buffer {
            conf.page_buffer = page_buffer;
        }
        if let Some(num_workers) = args.num_workers {
            conf.num_workers = num_workers;
        }
        if let Some(n) = args.concurrent {
            conf.throttle = Some(Throttle::Concurrent(n));
        }
        if let Some(n) = args.per_second {
            conf.throttle = Some(Throttle::PerSecond(n));
        }
        if let Some(secs) = args.delay {
            conf.throttle = Some(Throttle::Delay(secs));
        }
        if let Some(on_dl_error) = args.on_dl_error {
            conf.on_dl_error = on_dl_error;
        }
        if let Some(on_scrap_error) = args.on_scrap_error {
            conf.on_scrap_error = on_scrap_error;
        }
        if let Some(result_cap) = args.result_cap {
            conf.partition.result_cap = result_cap;
        }
        if let Some(slice_width) = args.slice_width {
            conf.partition.slice_width = slice_width;
        }
        if args.refine {
            conf.partition.refine = true;
        }
        if args.no_sigint {
            conf.handle_sigint = false;
        }
        Ok(conf)
    }
}

/// Search ads and scrap every one of them
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub query: QueryArgs,
    #[command(flatten)]
    pub crawler: CrawlerArgs,
    /// Directory receiving one `ad_{id}.json` file per ad
    #[arg(long, short, default_value = ".", conflicts_with = "jsonl")]
    pub output_dir: PathBuf,
    /// Write all ads to this file, one JSON record per line
    #[arg(long)]
    pub jsonl: Option<PathBuf>,
    /// How output files are opened, `create` skips ads already saved
    #[arg(long, value_enum, default_value_t = FileMode::Truncate)]
    pub file_mode: FileMode,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

pub fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let crawler_conf: CrawlerConfig = (&args.crawler).try_into()?;
    let query: SearchQuery = (&args.query).try_into()?;
    let output = match args.jsonl {
        Some(path) => Output::JsonLines(path),
        None => Output::Dir(args.output_dir),
    };

    let sink = RecordSink::spawn(&output, args.file_mode)?;
    let scraper_conf = AdScraperConfig {
        tx_record: sink.sender(),
    };
    let fetcher = HttpFetcher::new(&crawler_conf)?;
    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    let stats = rt.block_on(crawl_site::<AdScraper, _>(
        &crawler_conf,
        &scraper_conf,
        &fetcher,
        Seed::Query(query),
    ));
    drop(scraper_conf);

    sink.finish()?;
    stats.map(|_| ())
}

/// Print the search URLs a crawl would walk
#[derive(Debug, clap::Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub query: QueryArgs,
    #[command(flatten)]
    pub crawler: CrawlerArgs,
    /// Print the unique ad URLs found on the searches instead
    #[arg(long)]
    pub ads: bool,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

pub fn search(args: SearchArgs) -> anyhow::Result<()> {
    let crawler_conf: CrawlerConfig = (&args.crawler).try_into()?;
    let query: SearchQuery = (&args.query).try_into()?;
    let fetcher = HttpFetcher::new(&crawler_conf)?;

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    let urls = rt.block_on(async {
        let searches = plan_searches(&crawler_conf, &fetcher, &query).await?;
        if !args.ads {
            return Ok::<_, anyhow::Error>(searches);
        }
        let links = gather_ad_urls(&crawler_conf, &fetcher, &searches).await?;
        Ok(unique_ads(&links))
    })?;

    for url in urls {
        println!("{url}");
    }
    Ok(())
}

/// Scrap ad pages and print the records to stdout
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("page").required(true))]
pub struct ScrapArgs {
    /// A distant ad page to scrap
    #[arg(group = "page", long)]
    pub url: Option<String>,
    /// A local ad page to scrap
    #[arg(group = "page", long)]
    pub file: Option<PathBuf>,
    /// Local ad pages to scrap, such as `pages/ad_*.html`
    #[arg(group = "page", long)]
    pub glob: Option<String>,
    /// Ad id of the page when its location doesn't tell it
    #[arg(long, conflicts_with = "glob")]
    pub id: Option<String>,
    /// Custom user agent to download the page
    #[arg(long, requires = "url")]
    pub ua: Option<String>,
    /// Write records as `ad_{id}.json` files in this directory
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
    /// Number of CPU workers used to parse pages matching `glob`
    #[arg(long, requires = "glob")]
    pub num_workers: Option<usize>,
    /// Scrap error handling strategy for pages matching `glob`
    #[arg(long, value_enum, default_value_t = OnError::SkipAndLog)]
    pub on_error: OnError,
}

pub fn scrap(args: ScrapArgs) -> anyhow::Result<()> {
    let output = match args.output_dir {
        Some(dir) => Output::Dir(dir),
        None => Output::Stdout,
    };
    let sink = RecordSink::spawn(&output, FileMode::default())?;
    let config = AdScraperConfig {
        tx_record: sink.sender(),
    };

    let scraped = if let Some(pattern) = &args.glob {
        let num_workers = args
            .num_workers
            .unwrap_or_else(|| CrawlerConfig::default().num_workers);
        scrap_glob(&config, pattern, args.on_error, num_workers)
    } else {
        match load_page(args.url, args.file, args.ua) {
            Ok((page, location)) => match &args.id {
                Some(id) => AdScraper::new(&config)
                    .and_then(|mut scraper| scraper.scrap_with_id(page, &location, id)),
                None => scrap_page(&config, page, location),
            },
            Err(e) => Err(e),
        }
    };
    drop(config);

    sink.finish()?;
    scraped
}

fn load_page(
    url: Option<String>,
    file: Option<PathBuf>,
    ua: Option<String>,
) -> anyhow::Result<(String, PageLocation)> {
    if let Some(url) = url {
        let mut conf = CrawlerConfig::default();
        if let Some(ua) = ua {
            conf.user_agent = ua;
        }
        let fetcher = HttpFetcher::new(&conf)?;
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        let page = rt
            .block_on(fetcher.fetch(&url))
            .with_context(|| format!("Couldn't download {url}"))?;
        Ok((page, PageLocation::Url(url)))
    } else if let Some(path) = file {
        let page = fs::read_to_string(&path)
            .with_context(|| format!("Couldn't read {}", path.display()))?;
        Ok((page, PageLocation::Path(path)))
    } else {
        anyhow::bail!("Missing `url` or `file`");
    }
}

/// List known brands, or the models of a brand
#[derive(Debug, clap::Args)]
pub struct BrandsArgs {
    pub brand: Option<String>,
}

pub fn brands(args: BrandsArgs) -> anyhow::Result<()> {
    let Some(name) = args.brand else {
        for brand in BRANDS {
            println!("{}\t{}", brand.name, brand.code);
        }
        return Ok(());
    };

    let brand = find_brand(&name).ok_or_else(|| anyhow::anyhow!("Unknown brand {name:?}"))?;
    for model in brand.models {
        match model.kind {
            ModelKind::Single(code) => println!("{}\t{code}", model.name),
            ModelKind::Series { group, variants } => {
                println!("{}\t;{group}", model.name);
                for variant in variants {
                    println!("  {}\t{}", variant.name, variant.code);
                }
            }
        }
    }
    Ok(())
}

fn init_logger(filters: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filters)).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Crawl(args) => {
            if !args.quiet {
                init_logger("cas_crawler=info,cas_ads=info");
            }
            crawl(args)
        }
        SubCommand::Search(args) => {
            if !args.quiet {
                init_logger("cas_crawler=info,cas_ads=info");
            }
            search(args)
        }
        SubCommand::Scrap(args) => {
            init_logger("cas_ads=warn");
            scrap(args)
        }
        SubCommand::Brands(args) => brands(args),
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "cas", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use cas_search::{MakeFilter, ModelCode};

    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn crawler_overrides() {
        let SubCommand::Crawl(args) = parse(&[
            "cas",
            "crawl",
            "--per-second",
            "4",
            "--on-dl-error",
            "fail",
            "--slice-width",
            "500",
            "--refine",
            "--no-sigint",
        ]).cmd else {
            panic!("expected crawl");
        };
        let conf: CrawlerConfig = (&args.crawler).try_into().unwrap();

        assert_eq!(conf.throttle, Some(Throttle::PerSecond(NonZeroUsize::new(4).unwrap())));
        assert_eq!(conf.on_dl_error, OnError::Fail);
        assert_eq!(conf.on_scrap_error, OnError::SkipAndLog);
        assert_eq!(conf.partition.slice_width.get(), 500);
        assert_eq!(conf.partition.result_cap, 1000);
        assert!(conf.partition.refine);
        assert!(!conf.handle_sigint);
        assert_eq!(args.output_dir, PathBuf::from("."));
    }

    #[test]
    fn throttles_conflict() {
        assert!(Args::try_parse_from(["cas", "crawl", "--concurrent", "2", "--delay", "1"]).is_err());
    }

    #[test]
    fn query_from_filters() {
        let SubCommand::Search(args) = parse(&[
            "cas",
            "search",
            "--brand",
            "BMW",
            "--model",
            "series 3",
            "--seller-type",
            "seller",
            "--min-price",
            "0",
            "--max-price",
            "20000",
        ]).cmd else {
            panic!("expected search");
        };
        let query: SearchQuery = (&args.query).try_into().unwrap();

        assert_eq!(query.seller_type, Some(SellerType::Dealer));
        assert_eq!(query.price, Bounds::new(Some(0), Some(20000)));
        assert!(matches!(
            query.make,
            Some(MakeFilter {
                brand: 3500,
                model: Some(ModelCode::Group(21))
            })
        ));
    }

    #[test]
    fn unknown_brand_is_rejected() {
        let SubCommand::Crawl(args) = parse(&["cas", "crawl", "--brand", "trabant"]).cmd else {
            panic!("expected crawl");
        };
        assert!(SearchQuery::try_from(&args.query).is_err());
    }

    #[test]
    fn scrap_needs_a_page() {
        assert!(Args::try_parse_from(["cas", "scrap"]).is_err());
        assert!(Args::try_parse_from(["cas", "scrap", "--file", "a.html", "--ua", "x"]).is_err());
    }
}
