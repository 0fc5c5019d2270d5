//! Configuration types for collection and classification.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Built-in search queries covering Seoul's café districts.
pub const DEFAULT_QUERIES: &[&str] = &[
    // 광역
    "서울 스페셜티 커피",
    "서울 로스터리 카페",
    "서울 핸드드립 카페",
    // 강남권
    "강남 스페셜티", "강남 로스터리", "역삼 스페셜티", "압구정 로스터리",
    "청담 스페셜티", "신사동 로스터리", "삼성동 스페셜티",
    "서초 스페셜티", "양재 로스터리", "반포 스페셜티",
    "송파 스페셜티", "잠실 로스터리",
    // 마포/용산권
    "합정 스페셜티", "합정 로스터리", "망원 스페셜티", "연남동 로스터리",
    "홍대 스페셜티", "상수 로스터리", "연희동 스페셜티",
    "용산 스페셜티", "이태원 로스터리", "한남동 스페셜티",
    // 성동/광진
    "성수 스페셜티", "성수 로스터리", "뚝섬 스페셜티", "서울숲 로스터리",
    "건대 스페셜티", "자양동 로스터리",
    // 종로/중구
    "종로 스페셜티", "익선동 로스터리", "서촌 스페셜티", "북촌 로스터리",
    "을지로 스페셜티", "명동 로스터리",
    // 기타
    "영등포 스페셜티", "문래 로스터리", "여의도 스페셜티",
    "관악구 스페셜티", "샤로수길 로스터리",
    "성북구 스페셜티", "혜화 로스터리",
    "노원 스페셜티", "강동 로스터리",
];

/// Keywords marking a listing as not coffee.
///
/// Matched by substring against the case-folded name + description.
/// Note that `+` and `&` also reject size modifiers like "샷+1".
pub const DEFAULT_BLACKLIST: &[&str] = &[
    // 디저트/빵/베이커리
    "케이크", "케잌", "쿠키", "스콘", "크루아상", "크로와상", "빵", "베이글",
    "마카롱", "마들렌", "휘낭시에", "브라우니", "타르트", "파이", "푸딩",
    "도넛", "도너츠", "와플", "크로플", "팬케이크", "번", "롤", "까눌레",
    "몽블랑", "밀푀유", "슈크림", "에클레어", "티라미수", "무스", "바스크",
    "데니쉬", "페이스트리", "소금빵", "앙버터", "크림빵", "단팥빵",
    "카스테라", "시폰", "파운드", "생크림", "치즈케이크", "휘핑", "크런치",
    "초코볼", "초콜릿볼", "호두파이", "애플파이", "에그타르트", "프레첼",
    "츄러스", "츄로스", "붕어빵", "호떡", "떡", "인절미", "경단", "약과", "한과",
    // 음식/식사류
    "샌드위치", "토스트", "버거", "햄버거", "파스타", "피자", "리조또",
    "샐러드", "수프", "스프", "나초", "핫도그", "타코", "부리또",
    "브런치", "플레이트", "볼", "런치", "밥", "덮밥", "김밥", "죽",
    "오믈렛", "에그", "베이컨", "소시지", "감자튀김", "프렌치프라이",
    "치킨", "너겟", "윙", "스테이크", "그릴", "구이",
    // 빙수/아이스크림/요거트
    "빙수", "아이스크림", "젤라또", "젤라토", "소르베", "셔벗", "요거트",
    "아이스박스", "파르페", "선데", "소프트크림", "밀크셰이크", "쉐이크",
    // 차
    "녹차", "말차", "맛차", "홍차", "얼그레이", "캐모마일", "허브티",
    "루이보스", "자스민", "페퍼민트", "레몬차", "자몽차", "유자차",
    "생강차", "대추차", "쌍화차", "한방차", "호지차", "현미차",
    "보리차", "옥수수차", "둥굴레", "히비스커스", "라벤더티", "민트티",
    "로즈티", "국화차", "매실차", "오미자", "모과차", "꿀차", "율무차",
    "밀크티", "버블티", "타로", "타피오카", "공차", "펄",
    "아이스티", "레몬티", "피치티", "애플티",
    // 과일 음료/에이드/스무디
    "에이드", "스무디", "쥬스", "주스", "프레쉬", "프레시", "착즙",
    "복숭아", "딸기", "망고", "청포도", "자몽", "레몬", "라임", "오렌지",
    "블루베리", "라즈베리", "체리", "수박", "멜론", "키위", "패션후르츠",
    "사과", "배", "바나나", "포도", "파인애플", "코코넛", "리치", "용과",
    "크랜베리", "아사이", "석류", "토마토", "당근", "샐러리", "케일",
    "그린", "레드", "옐로우", "퍼플",
    // 초콜릿/코코아
    "초코", "초콜릿", "핫초코", "코코아", "가나슈",
    // 주류
    "하이볼", "맥주", "와인", "칵테일", "위스키", "럼", "진",
    "소주", "막걸리", "사케", "모히또", "상그리아",
    // 상품/굿즈
    "굿즈", "텀블러", "머그컵", "원두", "드립백", "캡슐",
    "패키지", "기프트", "선물세트", "박스", "보틀", "컵",
    // 세트/구성
    "세트", "+", "&", "콤보", "페어링",
    // 기타 비커피
    "우유", "밀크", "두유", "아몬드밀크", "오트밀크", "귀리",
    "꿀", "시럽", "휘핑크림", "생수", "탄산수", "토닉워터",
];

/// Namespace prefixes used to locate entities in the embedded state blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorKeys {
    /// Prefix of the place-detail entity key
    pub place_detail_prefix: String,

    /// Root query entry holding per-query fields
    pub root_query_key: String,

    /// Prefix of the place-detail field inside the root query
    pub root_place_detail_prefix: String,

    /// Prefix of the description field inside the place-detail query
    pub description_prefix: String,

    /// Prefix of menu entity keys
    pub menu_prefix: String,
}

impl Default for ExtractorKeys {
    fn default() -> Self {
        Self {
            place_detail_prefix: "PlaceDetailBase:".to_string(),
            root_query_key: "ROOT_QUERY".to_string(),
            root_place_detail_prefix: "placeDetail({".to_string(),
            description_prefix: "description({".to_string(),
            menu_prefix: "Menu:".to_string(),
        }
    }
}

/// Inclusive price band for coffee listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: u32,
    pub max: u32,
}

impl Default for PriceBand {
    fn default() -> Self {
        Self {
            min: 2000,
            max: 15000,
        }
    }
}

impl PriceBand {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: u32) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Configuration for the coffee classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoffeeFilterConfig {
    pub blacklist: Vec<String>,
    pub price_band: PriceBand,
}

impl Default for CoffeeFilterConfig {
    fn default() -> Self {
        Self {
            blacklist: DEFAULT_BLACKLIST.iter().map(|k| k.to_string()).collect(),
            price_band: PriceBand::default(),
        }
    }
}

impl CoffeeFilterConfig {
    pub fn with_price_band(mut self, band: PriceBand) -> Self {
        self.price_band = band;
        self
    }

    pub fn with_blacklist(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.blacklist = keywords.into_iter().map(|k| k.into()).collect();
        self
    }
}

/// Politeness delays between page fetches.
///
/// Each pause waits at least `*_ms` plus a random jitter up to
/// `*_jitter_ms`. A zero interval disables that pause.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacingConfig {
    pub after_fetch_ms: u64,
    pub after_fetch_jitter_ms: u64,
    pub between_queries_ms: u64,
    pub between_queries_jitter_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            after_fetch_ms: 2000,
            after_fetch_jitter_ms: 3000,
            between_queries_ms: 3000,
            between_queries_jitter_ms: 5000,
        }
    }
}

impl PacingConfig {
    /// No pauses at all (tests, replay runs).
    pub fn disabled() -> Self {
        Self {
            after_fetch_ms: 0,
            after_fetch_jitter_ms: 0,
            between_queries_ms: 0,
            between_queries_jitter_ms: 0,
        }
    }
}

/// Retry policy for search requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each later one
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_ms: 3000,
        }
    }
}

impl RetryConfig {
    pub fn no_backoff(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_ms: 0,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Configuration for a collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    pub queries: Vec<String>,

    /// Addresses must contain this to be in scope
    pub region: String,

    /// Result handles requested per query
    pub max_results: usize,

    /// Stop once this many stores are accepted
    pub max_stores: usize,

    pub coffee: CoffeeFilterConfig,
    pub keys: ExtractorKeys,
    pub pacing: PacingConfig,
    pub retry: RetryConfig,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
            region: "서울".to_string(),
            max_results: 10,
            max_stores: 300,
            coffee: CoffeeFilterConfig::default(),
            keys: ExtractorKeys::default(),
            pacing: PacingConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl CollectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queries(mut self, queries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.queries = queries.into_iter().map(|q| q.into()).collect();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_max_stores(mut self, max: usize) -> Self {
        self.max_stores = max;
        self
    }

    pub fn with_coffee(mut self, coffee: CoffeeFilterConfig) -> Self {
        self.coffee = coffee;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Defaults overridden by `CAFE_*` environment variables.
    ///
    /// Loads `.env` if present (development).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(region) = lookup("CAFE_REGION") {
            config.region = region;
        }
        if let Some(max) = parse_var(&lookup, "CAFE_MAX_STORES")? {
            config.max_stores = max;
        }
        if let Some(max) = parse_var(&lookup, "CAFE_MAX_RESULTS")? {
            config.max_results = max;
        }
        if let Some(min) = parse_var(&lookup, "CAFE_MIN_PRICE")? {
            config.coffee.price_band.min = min;
        }
        if let Some(max) = parse_var(&lookup, "CAFE_MAX_PRICE")? {
            config.coffee.price_band.max = max;
        }

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| PipelineError::Config {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
