// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持法语（默认）、英文、中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言（报告消息面向 G4IT 法语用户）
pub const DEFAULT_LOCALE: &str = "fr";

/// 支持的语言
pub const SUPPORTED_LOCALES: &[&str] = &["fr", "en", "zh-CN"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// 不支持的语言代码回退到默认语言，返回实际生效的语言。
pub fn set_locale(locale: &str) -> &'static str {
    let effective = SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| l.eq_ignore_ascii_case(locale))
        .unwrap_or(DEFAULT_LOCALE);
    rust_i18n::set_locale(effective);
    effective
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use g4it_inventory::i18n::t;
/// let msg = t("validation.no_data");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use g4it_inventory::i18n::t_with_args;
/// let msg = t_with_args("validation.invalid_integer", &[("value", "abc")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
