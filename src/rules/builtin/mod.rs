//! Built-in rule table.

mod caching;
mod markup;
mod requests;
mod server;

use std::sync::Arc;

use super::{BuiltinRule, Category, Rule};

macro_rules! info_url {
    ($anchor:literal) => {
        concat!("http://developer.yahoo.com/performance/rules.html", "#", $anchor)
    };
}

/// All built-in rules, in registration order.
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    let table: [BuiltinRule; 23] = [
        BuiltinRule {
            id: "ynumreq",
            name: "Make fewer HTTP requests",
            info: "Decreasing the number of components on a page reduces the number of HTTP requests required to render the page, resulting in faster page loads.",
            info_url: info_url!("num_http"),
            category: &[Category::Content],
            defaults: requests::ynumreq_defaults,
            lint: requests::ynumreq,
        },
        BuiltinRule {
            id: "ycdn",
            name: "Use a CDN",
            info: "Serving static components from servers close to the user reduces network latency.",
            info_url: info_url!("cdn"),
            category: &[Category::Server],
            defaults: server::ycdn_defaults,
            lint: server::ycdn,
        },
        BuiltinRule {
            id: "yexpires",
            name: "Add an Expires header",
            info: "Far-future expiration dates let browsers reuse cached static components instead of requesting them again.",
            info_url: info_url!("expires"),
            category: &[Category::Server],
            defaults: caching::yexpires_defaults,
            lint: caching::yexpires,
        },
        BuiltinRule {
            id: "ycompress",
            name: "Compress components",
            info: "Compressing text responses reduces their transfer size and the time to download them.",
            info_url: info_url!("gzip"),
            category: &[Category::Server],
            defaults: server::ycompress_defaults,
            lint: server::ycompress,
        },
        BuiltinRule {
            id: "ycsstop",
            name: "Put CSS at the top",
            info: "Stylesheets in the document head let the page render progressively.",
            info_url: info_url!("css_top"),
            category: &[Category::Css],
            defaults: markup::ycsstop_defaults,
            lint: markup::ycsstop,
        },
        BuiltinRule {
            id: "yjsbottom",
            name: "Put Javascript at the bottom",
            info: "Scripts block rendering of everything below them and parallel downloads while they load.",
            info_url: info_url!("js_bottom"),
            category: &[Category::Javascript],
            defaults: markup::yjsbottom_defaults,
            lint: markup::yjsbottom,
        },
        BuiltinRule {
            id: "yexpressions",
            name: "Avoid CSS expressions",
            info: "CSS expressions are evaluated far more often than expected and slow the page down.",
            info_url: info_url!("css_expressions"),
            category: &[Category::Css],
            defaults: markup::yexpressions_defaults,
            lint: markup::yexpressions,
        },
        BuiltinRule {
            id: "yexternal",
            name: "Make JS and CSS external",
            info: "External scripts and stylesheets can be cached separately from the HTML document.",
            info_url: info_url!("external"),
            category: &[Category::Javascript, Category::Css],
            defaults: markup::yexternal_defaults,
            lint: markup::yexternal,
        },
        BuiltinRule {
            id: "ydns",
            name: "Reduce DNS lookups",
            info: "Every distinct host name costs a DNS lookup before anything can be downloaded from it.",
            info_url: info_url!("dns_lookups"),
            category: &[Category::Content],
            defaults: requests::ydns_defaults,
            lint: requests::ydns,
        },
        BuiltinRule {
            id: "yminify",
            name: "Minify JS and CSS",
            info: "Removing comments and whitespace from code reduces its size.",
            info_url: info_url!("minify"),
            category: &[Category::Javascript, Category::Css],
            defaults: markup::yminify_defaults,
            lint: markup::yminify,
        },
        BuiltinRule {
            id: "yredirects",
            name: "Avoid redirects",
            info: "Redirects add a round trip before the real resource can be requested.",
            info_url: info_url!("redirects"),
            category: &[Category::Content],
            defaults: requests::yredirects_defaults,
            lint: requests::yredirects,
        },
        BuiltinRule {
            id: "ydupes",
            name: "Remove duplicate JS and CSS",
            info: "Duplicate scripts and stylesheets waste requests and evaluation time.",
            info_url: info_url!("js_dupes"),
            category: &[Category::Javascript, Category::Css],
            defaults: requests::ydupes_defaults,
            lint: requests::ydupes,
        },
        BuiltinRule {
            id: "yetags",
            name: "Configure ETags",
            info: "Default server ETags embed machine-specific data and defeat caching across a server farm.",
            info_url: info_url!("etags"),
            category: &[Category::Server],
            defaults: caching::yetags_defaults,
            lint: caching::yetags,
        },
        BuiltinRule {
            id: "yxhr",
            name: "Make Ajax cacheable",
            info: "Cacheable AJAX responses avoid waiting on the network for data that has not changed.",
            info_url: info_url!("cacheajax"),
            category: &[Category::Content],
            defaults: caching::yxhr_defaults,
            lint: caching::yxhr,
        },
        BuiltinRule {
            id: "yxhrmethod",
            name: "Use GET for AJAX Requests",
            info: "GET requests are sent in a single packet and can be cached.",
            info_url: info_url!("ajax_get"),
            category: &[Category::Server],
            defaults: server::yxhrmethod_defaults,
            lint: server::yxhrmethod,
        },
        BuiltinRule {
            id: "ymindom",
            name: "Reduce the Number of DOM Elements",
            info: "A large DOM slows down scripting, styling and layout.",
            info_url: info_url!("min_dom"),
            category: &[Category::Content],
            defaults: requests::ymindom_defaults,
            lint: requests::ymindom,
        },
        BuiltinRule {
            id: "yno404",
            name: "No 404s",
            info: "Requests that end in a 404 waste a round trip and may block rendering.",
            info_url: info_url!("no404"),
            category: &[Category::Content],
            defaults: requests::yno404_defaults,
            lint: requests::yno404,
        },
        BuiltinRule {
            id: "ymincookie",
            name: "Reduce Cookie Size",
            info: "Cookies are sent with every request to their domain, so large cookies slow every request down.",
            info_url: info_url!("cookie_size"),
            category: &[Category::Cookie],
            defaults: server::ymincookie_defaults,
            lint: server::ymincookie,
        },
        BuiltinRule {
            id: "ycookiefree",
            name: "Use Cookie-free Domains",
            info: "Static components served from a domain without cookies avoid sending cookie bytes with every request.",
            info_url: info_url!("cookie_free"),
            category: &[Category::Cookie],
            defaults: server::ycookiefree_defaults,
            lint: server::ycookiefree,
        },
        BuiltinRule {
            id: "ynofilter",
            name: "Avoid Filters",
            info: "The AlphaImageLoader filter blocks rendering and freezes the browser while the image loads.",
            info_url: info_url!("no_filters"),
            category: &[Category::Css],
            defaults: markup::ynofilter_defaults,
            lint: markup::ynofilter,
        },
        BuiltinRule {
            id: "yimgnoscale",
            name: "Don't Scale Images in HTML",
            info: "Images larger than their display size waste bytes.",
            info_url: info_url!("no_scale"),
            category: &[Category::Images],
            defaults: markup::yimgnoscale_defaults,
            lint: markup::yimgnoscale,
        },
        BuiltinRule {
            id: "yfavicon",
            name: "Make favicon Small and Cacheable",
            info: "Browsers always request the favicon, so it should be small and cached for a long time.",
            info_url: info_url!("favicon"),
            category: &[Category::Images],
            defaults: caching::yfavicon_defaults,
            lint: caching::yfavicon,
        },
        BuiltinRule {
            id: "yemptysrc",
            name: "Avoid empty src or href",
            info: "An empty src or href makes the browser request the page itself again.",
            info_url: info_url!("emptysrc"),
            category: &[Category::Server],
            defaults: requests::yemptysrc_defaults,
            lint: requests::yemptysrc,
        },
    ];
    table
        .into_iter()
        .map(|rule| Arc::new(rule) as Arc<dyn Rule>)
        .collect()
}

#[cfg(test)]
pub(super) mod fixture {
    //! Page builders for rule tests.

    use std::sync::Arc;

    use crate::collection::ComponentCollection;
    use crate::component::{ComponentType, NetResponse, StaticFetcher};

    pub const BASE: &str = "http://www.example.com/";

    /// A completed collection holding one component per entry.
    ///
    /// Relative URLs resolve against [`BASE`]; listing a URL twice registers
    /// it twice.
    pub fn page(entries: Vec<(&str, ComponentType, NetResponse)>) -> ComponentCollection {
        let mut fetcher = StaticFetcher::new();
        let mut refs = Vec::new();
        for (url, kind, response) in entries {
            let absolute = crate::collection::resolve_component_url(url, BASE)
                .unwrap_or_else(|| url.to_string());
            fetcher.insert(absolute, response);
            refs.push((url.to_string(), kind));
        }
        let mut cset = ComponentCollection::new(Arc::new(fetcher));
        for (url, kind) in refs {
            cset.add_component(&url, kind, BASE, None);
        }
        cset.notify_peel_done();
        cset
    }

    pub fn ok() -> NetResponse {
        NetResponse::new(200)
    }
}
