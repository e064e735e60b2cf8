/// Built-in configuration values. `Config::default()` is assembled from these,
/// and any table omitted from `config.toml` falls back to the matching entry here.

// Tracked applications: (display name, Play Store package id)
pub const DEFAULT_APPS: &[(&str, &str)] = &[
    ("Maxis", "com.maxis.mymaxis"),
    ("Digi", "com.digi.portal.mobdev.android"),
    ("Celcom", "com.celcom.mycelcom"),
    ("UMobile", "com.omesti.myumobile"),
    ("TuneTalk", "com.tunetalk.jmango.tunetalkimsi"),
];

// Declaration order is the match order: the first region with a hit wins.
pub const DEFAULT_REGION_KEYWORDS: &[(&str, &[&str])] = &[
    ("Kuala Lumpur", &["kl", "kuala lumpur"]),
    (
        "Selangor",
        &["selangor", "subang", "shah alam", "pj", "petaling", "gombak", "kajang", "sepang", "hulu langat"],
    ),
    (
        "Penang",
        &["penang", "pulau pinang", "georgetown", "bukit mertajam", "balik pulau", "nibong tebal"],
    ),
    (
        "Johor",
        &[
            "johor", "jb", "johor bahru", "batu pahat", "muar", "kluang", "segamat", "kulai", "pontian",
            "tangkak", "mersing", "kahang", "labis",
        ],
    ),
    (
        "Sabah",
        &[
            "sabah", "kota kinabalu", "kk", "sandakan", "tawau", "keningau", "lahad datu", "semporna",
            "beaufort", "ranau", "kunak", "tenom",
        ],
    ),
    (
        "Sarawak",
        &[
            "sarawak", "kuching", "miri", "sibu", "bintulu", "sri aman", "mukah", "limbang", "kapit",
            "betong", "sarikei",
        ],
    ),
    (
        "Perak",
        &[
            "perak", "ipoh", "taiping", "batu gajah", "teluk intan", "sitiawan", "kampar", "parit buntar",
            "lenggong",
        ],
    ),
    (
        "Negeri Sembilan",
        &[
            "seremban", "negeri sembilan", "port dickson", "nilai", "jempol", "rembau", "tampin",
            "kuala pilah",
        ],
    ),
    (
        "Pahang",
        &["pahang", "kuantan", "temerloh", "bentong", "raub", "maran", "pekan", "bera", "jerantut", "lipis"],
    ),
    ("Malacca", &["melaka", "malacca", "alor gajah", "jasin"]),
    (
        "Kelantan",
        &[
            "kelantan", "kota bharu", "tanah merah", "machang", "pasir mas", "kuala krai", "gua musang",
            "jeli", "bachok",
        ],
    ),
    (
        "Terengganu",
        &["terengganu", "kuala terengganu", "dungun", "kemaman", "marang", "besut", "setiu"],
    ),
    (
        "Kedah",
        &["kedah", "alor setar", "sungai petani", "kulim", "langkawi", "pendang", "baling", "kuala muda"],
    ),
    ("Perlis", &["perlis", "kangar", "arau", "padang besar", "kuala perlis"]),
];

// Declaration order is the match order: the first category with a hit wins.
pub const DEFAULT_CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Login",
        &["login", "sign in", "sign up", "register", "authentication", "activate", "active", "password", "username"],
    ),
    (
        "Billing",
        &[
            "bill", "reload", "beli", "prepaid", "pospaid", "ringgit", "rm", "kredit", "credit", "bil", "bayar",
            "mahal", "murah", "payment", "invoice", "charge", "price", "fee",
        ],
    ),
    (
        "Network",
        &["signal", "network", "line", "coverage", "internet", "data", "speed", "4g", "5g", "wifi", "connection"],
    ),
    (
        "App",
        &[
            "app", "apps", "application", "crash", "bug", "update", "install", "version", "load", "freeze",
            "sistem", "system",
        ],
    ),
    (
        "Customer Service",
        &["support", "service", "services", "help", "response", "agent", "representative"],
    ),
    ("General", &["good", "bad", "excellent", "poor", "worst", "best", "happy", "angry"]),
];

pub const GENERAL_CATEGORY: &str = "General";

// Detector code -> output tag. Codes are ISO 639-3 as reported by whatlang,
// which files Malay text under `ind`. whatlang never emits `zlm`; that row
// only matters for a detector with a separate Malay model.
pub const DEFAULT_LANGUAGE_CODES: &[(&str, &str)] = &[
    ("ind", "MS"),
    ("zlm", "MS"),
    ("cmn", "CN"),
    ("eng", "EN"),
    ("tam", "TA"),
];
pub const DEFAULT_LANGUAGE_TAG: &str = "EN";
pub const UNKNOWN_LANGUAGE_TAG: &str = "Unknown";

pub const PLACEHOLDER_AUTHOR: &str = "A Google User";
pub const COUNTRY_LABEL: &str = "Malaysia";

// Malaysia Time, the zone the review timestamps are bucketed in
pub const UTC_OFFSET_HOURS: i32 = 8;

pub const FETCH_LANG: &str = "en";
pub const FETCH_COUNTRY: &str = "my";
pub const BATCH_SIZE: u32 = 200;
pub const MAX_TOTAL_REVIEWS: usize = 100_000;
pub const REQUEST_DELAY_SECS: u64 = 5;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const WINDOW_START: &str = "2020-01-01";

pub const OUTPUT_DIR: &str = "output";
pub const LOG_DIR: &str = "logs";
pub const CONFIG_PATH: &str = "config.toml";
pub const METRICS_SNAPSHOT_FILE: &str = "metrics.prom";

/// Output file name for one tracked application.
pub fn output_file_name(app_name: &str) -> String {
    format!("{app_name}_reviews.csv")
}

/// Synthetic author name substituted for the placeholder author.
pub fn anonymized_author(app_name: &str) -> String {
    format!("User{app_name}")
}
