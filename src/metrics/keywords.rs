//! Default keyword dictionaries
//!
//! Domain keywords drive instrument ratings, mission domains and skill
//! categories. Category keywords classify merged projects. Both tables are
//! ordered: earlier entries win ties.

use crate::projects::Category;

const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Data Engineering",
        &[
            "sql", "etl", "duckdb", "snowflake", "pipeline", "warehouse", "spark", "kafka",
            "airflow", "parquet", "delta", "iceberg", "dbt", "bigquery", "redshift", "postgres",
            "mysql", "sqlite", "database", "schema", "data lake", "data mesh", "batch",
            "streaming", "ingestion",
        ],
    ),
    (
        "Frontend",
        &[
            "react", "next.js", "nextjs", "tailwind", "typescript", "d3", "css", "html",
            "svelte", "vue", "angular", "framer motion", "recharts", "component", "jsx", "tsx",
            "webpack", "vite", "responsive", "shadcn", "radix", "ui/ux",
        ],
    ),
    (
        "Backend",
        &[
            "fastapi", "python", "node", "express", "api", "rest", "graphql", "django", "flask",
            "websocket", "socket.io", "grpc", "microservice", "middleware", "endpoint", "route",
            "server", "http",
        ],
    ),
    (
        "DevOps",
        &[
            "docker", "nginx", "systemd", "ci/cd", "github actions", "terraform", "kubernetes",
            "k8s", "helm", "ansible", "jenkins", "deploy", "monitoring", "grafana", "prometheus",
            "vercel", "aws", "gcp", "azure", "linux", "ubuntu", "ssh", "pm2",
        ],
    ),
    (
        "IoT / Edge",
        &[
            "raspberry pi", "arduino", "mesh", "lora", "lorawan", "mqtt", "edge computing",
            "iot", "sensor", "gpio", "i2c", "spi", "microcontroller", "esp32", "zigbee",
            "bluetooth", "ble", "meshtastic", "firmware",
        ],
    ),
    (
        "AI / ML",
        &[
            "llm", "ollama", "embeddings", "vector", "rag", "transformer", "gpt", "claude",
            "openai", "anthropic", "machine learning", "neural", "tensorflow", "pytorch",
            "huggingface", "fine-tune", "prompt", "inference", "model", "ai", "nlp", "chatbot",
            "langchain", "agent",
        ],
    ),
    (
        "Systems",
        &[
            "c/c++", "rust", "protocol", "low-level", "assembly", "kernel", "memory",
            "performance", "concurrency", "threading", "async", "binary", "socket", "tcp", "udp",
            "serial",
        ],
    ),
    (
        "Security",
        &[
            "tls", "ed25519", "trng", "crypto", "encryption", "certificate", "auth", "oauth",
            "jwt", "ssl", "hash", "signing", "key", "security", "firewall", "vpn", "wireguard",
        ],
    ),
];

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Hardware,
        &[
            "esp32", "raspberry pi", "rpi", "arduino", "lora", "mesh", "ble", "bluetooth", "wifi",
            "802.11", "probe", "sensor", "gpio", "uart", "spi", "i2c", "firmware", "zephyr",
            "rtos", "nrf52", "stm32", "platformio", "freertos", "pcb", "antenna", "rf", "radio",
            "rtl-sdr", "sdr", "usb", "entropy",
        ],
    ),
    (
        Category::AiMl,
        &[
            "claude", "llm", "gpt", "language model", "nlp", "prompt", "embedding",
            "transformer", "inference", "fine-tune", "rag", "agent", "sovereign", "compiler",
            "lexer", "parser", "repl", "language design", "type system",
        ],
    ),
    (
        Category::Data,
        &[
            "snowflake", "duckdb", "etl", "pipeline", "data warehouse", "dimensional", "dbt",
            "airflow", "spark", "kafka", "sql", "analytics", "schema", "migration", "parquet",
            "arrow",
        ],
    ),
    (
        Category::Systems,
        &[
            "docker", "kubernetes", "nginx", "deployment", "ci/cd", "microservice", "api",
            "fastapi", "distributed", "devops", "monitoring", "terraform", "infrastructure",
            "campaign brain", "sysforge", "mcp", "webhook", "gateway",
        ],
    ),
    (
        Category::Creative,
        &[
            "eeg", "brainwave", "generative", "art", "music", "experiment", "research",
            "prototype", "trng", "random", "entropy", "creative", "visualization", "three.js",
            "d3", "interactive",
        ],
    ),
];

const TECH_PATTERNS: &[&str] = &[
    "Python", "TypeScript", "JavaScript", "React", "Next.js", "Tailwind CSS", "D3.js",
    "Node.js", "FastAPI", "Flask", "Django", "Docker", "Nginx", "PostgreSQL", "SQLite", "DuckDB",
    "Redis", "MongoDB", "Snowflake", "AWS", "GCP", "Azure", "Vercel", "GitHub Actions",
    "Terraform", "Kubernetes", "Raspberry Pi", "Arduino", "ESP32", "MQTT", "LoRa", "Ollama",
    "LangChain", "OpenAI", "Anthropic", "Rust", "Go", "C++", "Svelte", "Vue.js", "Angular",
    "GraphQL", "REST API", "WebSocket", "Socket.IO", "Framer Motion", "Recharts", "Shadcn",
    "Radix UI", "Tailwind", "CSS", "HTML", "Bash", "Linux", "systemd", "PM2", "Git", "Markdown",
    "MDX", "JSON", "YAML", "TOML", "CSV", "Pandas", "NumPy", "Jupyter", "Matplotlib", "Seaborn",
    "TLS", "Ed25519", "JWT", "OAuth", "SSH", "WireGuard", "Meshtastic", "Zigbee", "Bluetooth",
    "I2C", "SPI", "GPIO", "SWR", "Zustand", "Redux", "MobX", "Prisma", "Drizzle", "Pydantic",
    "SQLAlchemy", "Alembic", "Pytest",
];

/// A named keyword list, all entries lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Domain {
    pub(crate) name: String,
    pub(crate) keywords: Vec<String>,
}

impl Domain {
    /// Number of distinct keywords that occur anywhere in `text`.
    pub(crate) fn presence(&self, text: &str) -> usize {
        self.keywords.iter().filter(|kw| text.contains(kw.as_str())).count()
    }
}

/// A technology name together with its lower-cased search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tech {
    pub(crate) name: String,
    pub(crate) needle: String,
}

#[derive(Debug, Clone)]
pub(crate) struct KeywordTables {
    pub(crate) domains: Vec<Domain>,
    pub(crate) categories: Vec<(Category, Vec<String>)>,
    pub(crate) techs: Vec<Tech>,
}

fn lowered(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            domains: DOMAIN_KEYWORDS
                .iter()
                .map(|(name, words)| Domain {
                    name: (*name).to_string(),
                    keywords: lowered(words),
                })
                .collect(),
            categories: CATEGORY_KEYWORDS
                .iter()
                .map(|(cat, words)| (*cat, lowered(words)))
                .collect(),
            techs: TECH_PATTERNS
                .iter()
                .map(|name| Tech {
                    name: (*name).to_string(),
                    needle: name.to_lowercase(),
                })
                .collect(),
        }
    }
}

impl KeywordTables {
    /// Technologies whose name occurs in already lower-cased `text`, in
    /// table order.
    pub(crate) fn techs_in<'a>(&'a self, text_lower: &'a str) -> impl Iterator<Item = &'a Tech> {
        self.techs
            .iter()
            .filter(move |t| text_lower.contains(t.needle.as_str()))
    }

    /// The first domain listing `tech` as one of its keywords.
    pub(crate) fn domain_of_tech(&self, tech: &Tech) -> Option<&str> {
        self.domains
            .iter()
            .find(|d| d.keywords.iter().any(|kw| *kw == tech.needle))
            .map(|d| d.name.as_str())
    }
}
