/// Built-in product page patterns, keyed by exact hostname
///
/// Each entry is `(host, regex, match_query)`. Regexes are searched (not anchored
/// at the start) in the URL path, or in `path?query` when `match_query` is set.
pub(crate) const BUILTIN_PATTERNS: &[(&str, &str, bool)] = &[
    ("wearenicerice.com", r"/products/[\w-]+-\d+", false),
    ("www.myntra.com", r"/\d+(?:/buy)?$", false),
    ("www2.hm.com", r"/productpage\.\d+\.html$", false),
    ("www.nykaa.com", r"/p/\d+\?productId=\d+", true),
    ("www.nykaafashion.com", r"/p/\d+$", false),
    ("www.flipkart.com", r"/p/itm[a-zA-Z0-9]+", false),
    ("www.thesouledstore.com", r"/product/[\w-]+-\d+", false),
    ("coverstory.co.in", r"/product/[\w-]+-\d+", false),
    ("in.urbanic.com", r"/details/[\w-]+-\d+", false),
    ("www.savana.com", r"/details/[\w-]+-\d+", false),
    ("www.bewakoof.com", r"/p/[\w-]+", false),
    ("www.nike.com", r"/in/t/[\w-]+-[\w\d]+/[\w\d-]+", false),
    ("forever21.abfrl.in", r"/p/[\w-]+-\d+\.html", false),
    ("in.puma.com", r"/pd/[\w-]+/\d+", false),
    ("aeo.abfrl.in", r"/p/[\w-]+-\d+\.html", false),
    ("aarke.ritukumar.com", r"/product/[\w-]+-\d+", false),
    ("www.jaypore.com", r"/p/[\w-]+-\d+\.html", false),
    ("superdry.in", r"/product/[\w-]+-\d+", false),
    // 5+ digit product id at the end of the slug
    ("www.fabindia.com", r"/[\w-]+-(\d{5,})$", false),
];
