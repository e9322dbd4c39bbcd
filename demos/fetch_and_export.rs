//! This is an example of how event-pantry can be used

use std::path::Path;

use event_pantry::worker::progress::FetchEvent;
use event_pantry::{Client, Config, FilterCriteria, Provider};

// TODO: change these values with yours
pub const API_POSTS: &str = "https://csodalatosmagyarorszag.hu/wp-json/wp/v2/posts";
pub const API_CATEGORIES: &str = "https://csodalatosmagyarorszag.hu/wp-json/wp/v2/categories";

const CACHE_FOLDER: &str = "./cache";
const EXPORT_FILE: &str = "./events.xlsx";

#[tokio::main]
async fn main() {
    env_logger::init();

    println!("This example fetches every event of a WordPress site, page by page, and");
    println!("exports the filtered result to an Excel workbook.");
    println!("You can set the RUST_LOG environment variable to display more info about the fetch.");
    println!();
    println!("This will use the following settings:");
    println!("  * API_POSTS = {}", API_POSTS);
    println!("  * API_CATEGORIES = {}", API_CATEGORIES);
    println!("  * CACHE_FOLDER = {}", CACHE_FOLDER);
    println!();

    let config = Config::new(
        API_POSTS.parse().unwrap(),
        API_CATEGORIES.parse().unwrap(),
        CACHE_FOLDER,
    );
    let client = Client::new(&config).unwrap();
    let mut provider = Provider::new(client, &config);

    if provider.load_cached() {
        println!(
            "---- {} cached events are available before the fetch even starts ----",
            provider.model().snapshot().len()
        );
    } else {
        println!("---- No cache yet, starting from an empty snapshot ----");
    }

    let mut receiver = provider.start_fetch().unwrap();
    while let Some(event) = receiver.recv().await {
        match &event {
            FetchEvent::Progress { pages_done, pages_total } => {
                println!("  page {}/{}", pages_done, pages_total);
            }
            FetchEvent::Failed { error, pages_done } => {
                println!("  fetch failed after {} pages: {}", pages_done, error);
            }
            _ => {}
        }
        provider.apply(event);
    }

    println!(
        "---- {} events in the snapshot after the fetch ----",
        provider.model().snapshot().len()
    );

    // Keep only the events with "fesztivál" in their title or venue
    let criteria = FilterCriteria {
        text: "fesztivál".to_string(),
        ..FilterCriteria::default()
    };
    provider.set_filter(criteria);
    println!("{} events match the filter", provider.model().visible_count());

    provider.export_filtered(Path::new(EXPORT_FILE)).unwrap();
    println!("Done. The filtered table is in {}", EXPORT_FILE);
}
