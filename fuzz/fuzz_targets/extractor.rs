#![no_main]

use libfuzzer_sys::fuzz_target;

use striking_distance::analysis::check_presence;
use striking_distance::extractor::extract_page;

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let html = String::from_utf8_lossy(data);

    // Neither extraction nor matching may panic on arbitrary markup
    let page = extract_page("https://example.com", &html);
    let query: String = html.chars().take(24).collect();
    for field in [&page.title, &page.meta_description, &page.h1, &page.h2, &page.body] {
        let _ = check_presence(&query, field);
    }
});
