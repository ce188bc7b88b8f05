// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use crate::extract::RuleConfig;

/// 球队名称字段
pub const TEAM_NAME: &str = "Team Name";
/// 主教练字段
pub const HEAD_COACH: &str = "Head Coach";
/// 球队经理字段
pub const MANAGER: &str = "Manager";
/// 页面URL字段
pub const URL: &str = "Url";
/// 队徽链接字段
pub const LOGO_LINK: &str = "Logo Link";
/// 规范化球队名字段（由队徽反查）
pub const FRANCHISE: &str = "Franchise";

/// 球队资料页的提取方案
///
/// 每个球队页面产出一行：球队名、主教练、经理、页面URL、
/// 队徽链接和由队徽反查出的规范化球队名。页面的个人信息
/// 栏（team-personal-bar）把标签和值放在相邻的h5元素里，
/// 因此教练和经理从合并文本中用正则切出。
pub fn team_profile_rules() -> Vec<RuleConfig> {
    let bar = "div.team-personal-bar";
    vec![
        RuleConfig {
            field: TEAM_NAME.to_string(),
            selector: Some(format!("{} h3", bar)),
            attr: None,
            pattern: None,
            lookup: None,
            from_url: false,
            required: true,
        },
        RuleConfig {
            field: HEAD_COACH.to_string(),
            selector: Some(format!("{} h5", bar)),
            attr: None,
            pattern: Some(r"HEAD COACH\s+(.*?)(?:\s+MANAGER|$)".to_string()),
            lookup: None,
            from_url: false,
            required: false,
        },
        RuleConfig {
            field: MANAGER.to_string(),
            selector: Some(format!("{} h5", bar)),
            attr: None,
            pattern: Some(r"MANAGER\s+(.*)$".to_string()),
            lookup: None,
            from_url: false,
            required: false,
        },
        RuleConfig {
            field: URL.to_string(),
            selector: None,
            attr: None,
            pattern: None,
            lookup: None,
            from_url: true,
            required: true,
        },
        RuleConfig {
            field: LOGO_LINK.to_string(),
            selector: Some(format!("{} center img", bar)),
            attr: Some("src".to_string()),
            pattern: None,
            lookup: None,
            from_url: false,
            required: false,
        },
        RuleConfig {
            field: FRANCHISE.to_string(),
            selector: Some(format!("{} center img", bar)),
            attr: Some("src".to_string()),
            pattern: None,
            lookup: Some(logo_lookup()),
            from_url: false,
            required: false,
        },
    ]
}

/// 队徽URL到规范化球队名的映射
pub fn logo_lookup() -> HashMap<String, String> {
    [
        (
            "https://dashboard.pba.ph/assets/logo/Ginebra150.png",
            "Ginebra San Miguel",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/Blackwater_new_logo_2021.png",
            "Blackwater",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/converge-logo2.png",
            "Converge",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/magnolia-2022-logo.png",
            "Magnolia",
        ),
        ("https://dashboard.pba.ph/assets/logo/web_mer.png", "Meralco"),
        ("https://dashboard.pba.ph/assets/logo/web_nlx.png", "NLEX"),
        (
            "https://dashboard.pba.ph/assets/logo/GLO_web.png",
            "North Port",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/viber_image_2024-03-05_17-18-02-823.png",
            "Phoenix",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/web_ros.png",
            "Rain or Shine",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/SMB2020_web.png",
            "San Miguel",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/terrafirma.png",
            "TerraFirma",
        ),
        (
            "https://dashboard.pba.ph/assets/logo/tropang_giga_pba.png",
            "Talk N Text",
        ),
    ]
    .into_iter()
    .map(|(logo, team)| (logo.to_string(), team.to_string()))
    .collect()
}
