/// CNAME fingerprints for takeover-prone hosting providers, in match
/// priority order. Each pattern is a regex fragment searched
/// case-insensitively anywhere in the CNAME target.
pub const CNAME_FINGERPRINTS: &[(&str, &[&str])] = &[
    ("github", &[r"github\.io", r"github\.map\.fastly\.net"]),
    ("aws", &[r"s3\.amazonaws\.com", r"s3-website[.-]", r"elasticbeanstalk\.com"]),
    ("heroku", &[r"herokuapp\.com", r"herokudns\.com", r"herokussl\.com"]),
    (
        "azure",
        &[
            r"azurewebsites\.net",
            r"cloudapp\.azure\.com",
            r"cloudapp\.net",
            r"trafficmanager\.net",
            r"blob\.core\.windows\.net",
            r"azureedge\.net",
        ],
    ),
    ("cloudfront", &[r"cloudfront\.net"]),
    ("fastly", &[r"fastly\.net"]),
    ("netlify", &[r"netlify\.app", r"netlify\.com"]),
    ("vercel", &[r"vercel\.app", r"now\.sh"]),
    ("surge", &[r"surge\.sh"]),
    ("tumblr", &[r"domains\.tumblr\.com"]),
    ("shopify", &[r"myshopify\.com"]),
    ("unbounce", &[r"unbouncepages\.com"]),
    ("pantheon", &[r"pantheonsite\.io"]),
    ("wordpress", &[r"wordpress\.com"]),
    ("ghost", &[r"ghost\.io"]),
    ("readme", &[r"readme\.io"]),
    ("zendesk", &[r"zendesk\.com"]),
    ("bitbucket", &[r"bitbucket\.io"]),
    ("helpscout", &[r"helpscoutdocs\.com"]),
    ("cargo", &[r"cargocollective\.com"]),
    ("webflow", &[r"proxy\.webflow\.com", r"proxy-ssl\.webflow\.com"]),
];

/// Nuclei template filename per provider, relative to the template
/// directory. Keys are a subset of the fingerprint table's providers; a
/// provider without a template produces a `Skipped (No Template)` verdict.
pub const TAKEOVER_TEMPLATES: &[(&str, &str)] = &[
    ("github", "github-takeover.yaml"),
    ("aws", "aws-bucket-takeover.yaml"),
    ("heroku", "heroku-takeover.yaml"),
    ("azure", "azure-takeover.yaml"),
    ("fastly", "fastly-takeover.yaml"),
    ("netlify", "netlify-takeover.yaml"),
    ("vercel", "vercel-takeover.yaml"),
    ("surge", "surge-takeover.yaml"),
    ("tumblr", "tumblr-takeover.yaml"),
    ("shopify", "shopify-takeover.yaml"),
    ("unbounce", "unbounce-takeover.yaml"),
    ("pantheon", "pantheon-takeover.yaml"),
    ("wordpress", "wordpress-takeover.yaml"),
    ("ghost", "ghost-takeover.yaml"),
    ("readme", "readme-takeover.yaml"),
    ("zendesk", "zendesk-takeover.yaml"),
    ("bitbucket", "bitbucket-takeover.yaml"),
    ("helpscout", "helpscout-takeover.yaml"),
    ("cargo", "cargo-takeover.yaml"),
    ("webflow", "webflow-takeover.yaml"),
];
