use actix_cors::Cors;

/// 构建页面表单与 Stripe 回调使用的 CORS 配置
pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| {
            // 页面生成器可能托管在其他域名
            true
        })
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
