//! Internationalization module - Chinese and English support

use std::sync::{Mutex, OnceLock};

static CURRENT_LOCALE: OnceLock<Mutex<Locale>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    English,
    Chinese,
}

impl Locale {
    /// Detect locale from system environment
    pub fn detect() -> Self {
        // Check LANG, LC_ALL, LC_MESSAGES environment variables
        let lang = std::env::var("LANG")
            .or_else(|_| std::env::var("LC_ALL"))
            .or_else(|_| std::env::var("LC_MESSAGES"))
            .unwrap_or_default()
            .to_lowercase();

        Self::from_tag(&lang).unwrap_or(Locale::English)
    }

    /// Parse a language tag such as `zh_CN.UTF-8`, `zh`, `en` or `english`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        if tag.starts_with("zh") || tag == "chinese" || tag == "中文" {
            Some(Locale::Chinese)
        } else if tag.starts_with("en") {
            Some(Locale::English)
        } else {
            None
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Chinese => "zh",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::Chinese => "中文",
        }
    }
}

/// Initialize the global locale
pub fn init_locale() -> Locale {
    let locale = Locale::detect();
    let _ = CURRENT_LOCALE.set(Mutex::new(locale));
    locale
}

/// Initialize with specific locale
pub fn init_locale_with(locale: Locale) -> Locale {
    if CURRENT_LOCALE.set(Mutex::new(locale)).is_err() {
        set_locale(locale);
    }
    locale
}

/// Get current locale
pub fn current_locale() -> Locale {
    CURRENT_LOCALE
        .get()
        .and_then(|m| m.lock().ok())
        .map(|l| *l)
        .unwrap_or(Locale::Chinese)
}

/// Set current locale
pub fn set_locale(locale: Locale) {
    if let Some(mutex) = CURRENT_LOCALE.get() {
        if let Ok(mut current) = mutex.lock() {
            *current = locale;
        }
    }
}

/// Translation keys
#[derive(Debug, Clone, Copy)]
pub enum Text {
    // App titles and headers
    AppTitle,
    InputTitle,
    ProgressTitle,
    ResultsTitle,

    // Stage titles
    StageIntent,
    StageQuestion,
    StageStrategy,
    StageAiResponse,
    StageCourses,

    // Status messages
    Ready,
    Analyzing,
    Processing,
    ProcessingDescription,
    Completed,

    // UI Elements
    InputPlaceholder,
    PressEnterToSubmit,
    PressEscToQuit,
    NoRecommendations,

    // Field labels
    LabelIntent,
    LabelConfidence,
    LabelEntities,
    LabelOverallScore,
    LabelClarity,
    LabelSpecificity,
    LabelContext,
    LabelProfessionalism,
    LabelFollowUp,
    LabelSuggestions,
    LabelStrategy,
    LabelPriority,
    LabelTimeline,
    LabelApproach,
    LabelRiskLevel,
    LabelNotes,
    LabelAnswer,
    LabelKeyPoints,
    LabelSteps,
    LabelComplexity,
    LabelRelevance,
    LabelSource,
    LabelPage,

    // Errors
    DecodeError,
    ConnectionError,
    StageErrorFallback,

    // Auth
    LoginSuccess,
    LoggedOut,
    NotLoggedIn,
}

impl Text {
    pub fn get(&self) -> &'static str {
        match current_locale() {
            Locale::English => self.english(),
            Locale::Chinese => self.chinese(),
        }
    }

    fn english(&self) -> &'static str {
        match self {
            Text::AppTitle => "aurora - Intent Analysis",
            Text::InputTitle => "Analyze intent",
            Text::ProgressTitle => "Progress",
            Text::ResultsTitle => "Results",

            Text::StageIntent => "Intent analysis",
            Text::StageQuestion => "Question analysis",
            Text::StageStrategy => "Collection strategy",
            Text::StageAiResponse => "AI response",
            Text::StageCourses => "Recommended courses",

            Text::Ready => "Ready",
            Text::Analyzing => "Analyzing...",
            Text::Processing => "Processing",
            Text::ProcessingDescription => "Processing...",
            Text::Completed => "Completed",

            Text::InputPlaceholder => "Type the text to analyze...",
            Text::PressEnterToSubmit => "Enter to analyze",
            Text::PressEscToQuit => "Esc to quit",
            Text::NoRecommendations => "No related courses",

            Text::LabelIntent => "Intent",
            Text::LabelConfidence => "Confidence",
            Text::LabelEntities => "Entities",
            Text::LabelOverallScore => "Overall score",
            Text::LabelClarity => "Clarity",
            Text::LabelSpecificity => "Specificity",
            Text::LabelContext => "Context",
            Text::LabelProfessionalism => "Professionalism",
            Text::LabelFollowUp => "Follow-up questions",
            Text::LabelSuggestions => "Suggestions",
            Text::LabelStrategy => "Strategy",
            Text::LabelPriority => "Priority",
            Text::LabelTimeline => "Timeline",
            Text::LabelApproach => "Approach",
            Text::LabelRiskLevel => "Risk level",
            Text::LabelNotes => "Notes",
            Text::LabelAnswer => "Answer",
            Text::LabelKeyPoints => "Key points",
            Text::LabelSteps => "Implementation steps",
            Text::LabelComplexity => "Complexity",
            Text::LabelRelevance => "Relevance",
            Text::LabelSource => "Source",
            Text::LabelPage => "Page",

            Text::DecodeError => "Data parsing error",
            Text::ConnectionError => "Connection failed, please retry",
            Text::StageErrorFallback => "An error occurred",

            Text::LoginSuccess => "Logged in",
            Text::LoggedOut => "Logged out",
            Text::NotLoggedIn => "Not logged in",
        }
    }

    fn chinese(&self) -> &'static str {
        match self {
            Text::AppTitle => "aurora - 意图分析",
            Text::InputTitle => "分析用户意图",
            Text::ProgressTitle => "分析进度",
            Text::ResultsTitle => "分析结果",

            Text::StageIntent => "意图分析",
            Text::StageQuestion => "问题分析",
            Text::StageStrategy => "收集策略",
            Text::StageAiResponse => "AI响应",
            Text::StageCourses => "相关课程推荐",

            Text::Ready => "就绪",
            Text::Analyzing => "分析中...",
            Text::Processing => "处理中",
            Text::ProcessingDescription => "正在处理...",
            Text::Completed => "已完成",

            Text::InputPlaceholder => "输入要分析的文本...",
            Text::PressEnterToSubmit => "Enter 分析意图",
            Text::PressEscToQuit => "Esc 退出",
            Text::NoRecommendations => "暂无相关课程",

            Text::LabelIntent => "意图",
            Text::LabelConfidence => "置信度",
            Text::LabelEntities => "实体",
            Text::LabelOverallScore => "总体评分",
            Text::LabelClarity => "清晰度",
            Text::LabelSpecificity => "具体性",
            Text::LabelContext => "上下文",
            Text::LabelProfessionalism => "专业性",
            Text::LabelFollowUp => "追问建议",
            Text::LabelSuggestions => "改进建议",
            Text::LabelStrategy => "策略",
            Text::LabelPriority => "优先级",
            Text::LabelTimeline => "时间线",
            Text::LabelApproach => "方法",
            Text::LabelRiskLevel => "风险等级",
            Text::LabelNotes => "备注",
            Text::LabelAnswer => "回答",
            Text::LabelKeyPoints => "关键要点",
            Text::LabelSteps => "实施步骤",
            Text::LabelComplexity => "复杂度",
            Text::LabelRelevance => "相关度",
            Text::LabelSource => "来源",
            Text::LabelPage => "页码",

            Text::DecodeError => "数据解析错误",
            Text::ConnectionError => "连接出错，请重试",
            Text::StageErrorFallback => "发生错误",

            Text::LoginSuccess => "登录成功",
            Text::LoggedOut => "已退出登录",
            Text::NotLoggedIn => "未登录",
        }
    }
}

/// Shorthand for getting translated text
pub fn t(text: Text) -> &'static str {
    text.get()
}
