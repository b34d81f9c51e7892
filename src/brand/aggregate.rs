use crate::results::{AggregatedScrape, CrawledPage, PageType, SocialLink};
use crate::utils::truncate_chars;

/// Cap on the concatenated main text of all pages
pub const ALL_MAIN_TEXT_CAP: usize = 15_000;

/// Cap on merged image URLs
pub const AGGREGATED_IMAGE_CAP: usize = 300;

/// Cap on merged button and CTA samples, each
pub const AGGREGATED_COPY_CAP: usize = 30;

/// Merge per-page snapshots into one record.
///
/// Pages are stably sorted into home, about, services, contact, pricing
/// order first, so every first-wins rule below is independent of the order
/// the crawl visited them in. Single-valued fields come from the home page.
pub fn aggregate(url: &str, domain: &str, mut pages: Vec<CrawledPage>) -> AggregatedScrape {
    pages.sort_by_key(|p| p.page_type.priority());

    let mut scrape = AggregatedScrape {
        url: url.to_string(),
        domain: domain.to_string(),
        ..AggregatedScrape::default()
    };

    match pages.iter().find(|p| p.page_type == PageType::Home) {
        Some(home) => {
            let snap = &home.snapshot;
            scrape.title = snap.title.clone();
            scrape.meta_description = snap.meta_description.clone();
            scrape.og_title = snap.og_title.clone();
            scrape.og_description = snap.og_description.clone();
            scrape.og_image = snap.og_image.clone();
            scrape.og_site_name = snap.og_site_name.clone();
            scrape.logo_url = snap.logo_url.clone();
            scrape.hero_image = snap.hero_image.clone();
            scrape.colors = snap.colors.clone();
            scrape.footer_text = snap.footer_text.clone();
        }
        None => ::log::warn!("Aggregating {} without a home page", url),
    }

    let mut main_text = String::new();

    for page in &pages {
        let snap = &page.snapshot;
        scrape.pages_visited.push(page.page_type);

        extend_unique(&mut scrape.all_h1, &snap.h1);
        extend_unique(&mut scrape.all_h2, &snap.h2);

        let text = snap.main_text.trim();
        if !text.is_empty() {
            main_text.push_str(text);
            main_text.push_str("\n\n");
        }

        for link in &snap.social_links {
            merge_social_link(&mut scrape.social_links, link);
        }
        for data in &snap.structured_data {
            if !scrape.structured_data.contains(data) {
                scrape.structured_data.push(data.clone());
            }
        }

        if !text.is_empty() {
            let slot = match page.page_type {
                PageType::Home => None,
                PageType::About => Some(&mut scrape.about_page_text),
                PageType::Services => Some(&mut scrape.services_page_text),
                PageType::Contact => Some(&mut scrape.contact_page_text),
                PageType::Pricing => Some(&mut scrape.pricing_page_text),
            };
            if let Some(slot) = slot {
                if slot.is_none() {
                    *slot = Some(text.to_string());
                }
            }
        }

        extend_unique(&mut scrape.logo_system_raw.logo_urls, &snap.logo_system_raw.logo_urls);
        for favicon in &snap.logo_system_raw.favicons {
            if !scrape
                .logo_system_raw
                .favicons
                .iter()
                .any(|f| f.href == favicon.href)
            {
                scrape.logo_system_raw.favicons.push(favicon.clone());
            }
        }
        for (name, value) in &snap.color_system_raw {
            if !scrape.color_system_raw.contains_key(name) {
                scrape.color_system_raw.insert(name.clone(), value.clone());
            }
        }
        extend_unique(&mut scrape.copy_samples.button_texts, &snap.copy_samples.button_texts);
        extend_unique(&mut scrape.copy_samples.cta_texts, &snap.copy_samples.cta_texts);
        extend_unique(&mut scrape.all_image_urls, &snap.all_image_urls);
        extend_unique(&mut scrape.media_kit_urls, &snap.media_kit_links);
        extend_unique(&mut scrape.element_colors, &snap.element_colors);
    }

    scrape.all_main_text = truncate_chars(main_text.trim(), ALL_MAIN_TEXT_CAP);
    scrape.copy_samples.button_texts.truncate(AGGREGATED_COPY_CAP);
    scrape.copy_samples.cta_texts.truncate(AGGREGATED_COPY_CAP);
    scrape.all_image_urls.truncate(AGGREGATED_IMAGE_CAP);

    scrape
}

fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

fn merge_social_link(links: &mut Vec<SocialLink>, link: &SocialLink) {
    if !links.iter().any(|l| l.platform == link.platform) {
        links.push(link.clone());
    }
}
