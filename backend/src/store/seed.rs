//! Demo catalog loaded at start-up when `SEED_MOCK_DATA` is on.

use chrono::{DateTime, TimeZone, Utc};

use super::models::*;
use super::StoreData;
use crate::utils::net_of_fee;

/// Fixed timestamp for seed records.
fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn product(
    id: &str,
    name: &str,
    price_yuan: i64,
    sales: u32,
    category: &str,
    description: &str,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: price_yuan * 100,
        images: vec![format!("https://picsum.photos/seed/product{}/300/200", id)],
        sales,
        category: category.to_string(),
        description: description.to_string(),
        badge: None,
        platform: None,
        special_type: None,
        grants_identity: None,
        service_fee: Some(5),
    }
}

fn products() -> Vec<Product> {
    let mut list = vec![
        product("P1", "大师级陪练", 50, 1200, "技能陪练", "顶尖选手一对一陪练，技术与意识双提升。"),
        product("P2", "极速上分套餐", 100, 950, "段位提升", "专业团队快速上分，安全稳定。"),
        product("P3", "团队开黑语音", 20, 2500, "语音互动", "语音开黑，欢乐上分。"),
        product("P4", "大神带队通关", 80, 700, "副本攻略", "高难副本一次通关。"),
        product("P5", "娱乐休闲匹配", 15, 3000, "技能陪练", "轻松娱乐，不压力。"),
        product("P6", "王者晋级赛", 120, 500, "段位提升", "晋级赛全程护航。"),
        product("P7", "新手体验陪练", 5, 800, "新手试炼", "首次体验专享。"),
    ];

    list[0].badge = Some("热销".to_string());
    list[1].platform = Some(Platform::Mobile);
    list[5].platform = Some(Platform::Pc);
    list[5].service_fee = Some(10);

    let mut vip = product("P8", "VIP打手认证", 199, 120, "身份认证", "完成认证后获得VIP打手身份。");
    vip.special_type = Some(SpecialType::VipCertification);
    vip.grants_identity = Some(HitterIdentity::Vip);
    vip.service_fee = None;
    list.push(vip);

    list
}

fn users() -> Vec<User> {
    let mut boss = User::new("U1", "玩家_8888", "player8888@example.com");
    boss.balance = 50_000;
    boss.vip_level = "黄金老板".to_string();

    let mut hitter = User::new("U2", "大神_001", "dashen001@example.com");
    hitter.balance = 12_000;
    hitter.deposit = 50_000;
    hitter.unfreezable_balance = 8_000;
    // earnings of O2 and O4, accepted but not yet settled
    hitter.freezing_balance = 9_500 + 10_800;
    hitter.to_be_paid = 3_000;
    hitter.paid_out = 1_000;
    hitter.hitter_level = "大师打手".to_string();
    hitter.hitter_identity = HitterIdentity::Vip;
    hitter.income_level = "月入过万".to_string();
    hitter.seniority_level = "两年老将".to_string();
    hitter.badges = vec!["金牌陪练".to_string()];
    hitter.team_id = Some("T1".to_string());

    let mut tycoon = User::new("U3", "土豪哥", "tuhao@example.com");
    tycoon.balance = 200_000;
    tycoon.vip_level = "钻石老板".to_string();
    tycoon.upline_user_id = Some("U1".to_string());

    let mut rookie = User::new("U4", "萌新打手", "rookie@example.com");
    rookie.hitter_identity = HitterIdentity::Normal;
    rookie.status = AccountStatus::Frozen;

    let mut admin = User::new("U5", "运营管理员", "admin@example.com");
    admin.role = UserRole::Admin;

    vec![boss, hitter, tycoon, rookie, admin]
}

#[allow(clippy::too_many_arguments)]
fn order(
    id: &str,
    product: &Product,
    status: OrderStatus,
    buyer: &User,
    hitter_id: Option<&str>,
    order_time: DateTime<Utc>,
    accept_time: Option<DateTime<Utc>>,
    completion_time: Option<DateTime<Utc>>,
) -> Order {
    Order {
        id: id.to_string(),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        category: product.category.clone(),
        status,
        amount: product.price,
        user_id: buyer.id.clone(),
        user_name: buyer.name.clone(),
        hitter_id: hitter_id.map(str::to_string),
        hitter_earnings: hitter_id.map(|_| net_of_fee(product.price, product.service_fee)),
        platform: product.platform,
        game_id: format!("game-{}", buyer.id.to_lowercase()),
        server: "微信区".to_string(),
        notes: String::new(),
        text_id: format!("TXT-{}", id),
        order_time,
        accept_time,
        completion_time,
    }
}

fn orders(products: &[Product], users: &[User]) -> Vec<Order> {
    let boss = &users[0];
    let tycoon = &users[2];

    vec![
        order(
            "O1", &products[0], OrderStatus::Completed, boss, Some("U2"),
            at(2023, 10, 26, 9, 0), Some(at(2023, 10, 26, 9, 5)), Some(at(2023, 10, 26, 11, 0)),
        ),
        order(
            "O2", &products[1], OrderStatus::InProgress, boss, Some("U2"),
            at(2023, 10, 27, 14, 0), Some(at(2023, 10, 27, 14, 30)), None,
        ),
        order(
            "O3", &products[2], OrderStatus::PendingAccept, boss, None,
            at(2023, 10, 28, 20, 0), None, None,
        ),
        order(
            "O4", &products[5], OrderStatus::PendingSettlement, tycoon, Some("U2"),
            at(2023, 10, 28, 8, 0), Some(at(2023, 10, 28, 8, 10)), None,
        ),
        order(
            "O5", &products[3], OrderStatus::PendingAccept, tycoon, None,
            at(2023, 10, 29, 19, 0), None, None,
        ),
        order(
            "O6", &products[4], OrderStatus::PendingPayment, tycoon, None,
            at(2023, 10, 29, 21, 0), None, None,
        ),
    ]
}

fn bounties() -> Vec<Bounty> {
    vec![
        Bounty {
            id: "B1".to_string(),
            title: "急求大神带过最终BOSS".to_string(),
            description: "卡关一天了，来个强力输出，酬金丰厚！".to_string(),
            reward: 20_000,
            status: BountyStatus::InProgress,
            participants: 2,
            max_participants: 3,
            platform: None,
        },
        Bounty {
            id: "B2".to_string(),
            title: "五排车队缺一辅助".to_string(),
            description: "来个会玩的辅助，心态好，不压力。".to_string(),
            reward: 5_000,
            status: BountyStatus::InProgress,
            participants: 4,
            max_participants: 5,
            platform: Some(Platform::Mobile),
        },
        Bounty {
            id: "B3".to_string(),
            title: "新赛季开荒团".to_string(),
            description: "招募长期队友一起开荒，要求时间稳定。".to_string(),
            reward: 10_000,
            status: BountyStatus::Completed,
            participants: 5,
            max_participants: 5,
            platform: Some(Platform::Pc),
        },
    ]
}

fn teams() -> Vec<Team> {
    vec![
        Team {
            id: "T1".to_string(),
            name: "王者之师".to_string(),
            leader_name: "大神_001".to_string(),
            leader_id: "U2".to_string(),
            member_count: 12,
            status: AccountStatus::Active,
            created_at: at(2023, 9, 1, 0, 0),
        },
        Team {
            id: "T2".to_string(),
            name: "夜猫子车队".to_string(),
            leader_name: "萌新打手".to_string(),
            leader_id: "U4".to_string(),
            member_count: 3,
            status: AccountStatus::Frozen,
            created_at: at(2023, 10, 5, 0, 0),
        },
    ]
}

fn complaints() -> Vec<Complaint> {
    vec![
        Complaint {
            id: "C1".to_string(),
            order_id: "O2".to_string(),
            user_id: "U2".to_string(),
            user_name: "大神_001".to_string(),
            subject: "服务时长不足".to_string(),
            details: "陪练服务原定1小时，实际只有50分钟。".to_string(),
            status: ComplaintStatus::Pending,
            created_at: at(2023, 10, 28, 0, 0),
        },
        Complaint {
            id: "C2".to_string(),
            order_id: "O1".to_string(),
            user_id: "U1".to_string(),
            user_name: "玩家_8888".to_string(),
            subject: "账号登录异常".to_string(),
            details: "完成服务后，我的账号无法正常登录，怀疑有安全风险。".to_string(),
            status: ComplaintStatus::InProgress,
            created_at: at(2023, 10, 27, 0, 0),
        },
        Complaint {
            id: "C3".to_string(),
            order_id: "O3".to_string(),
            user_id: "U3".to_string(),
            user_name: "土豪哥".to_string(),
            subject: "货不对板".to_string(),
            details: "下单的是团队语音，但提供的是单人服务。".to_string(),
            status: ComplaintStatus::Resolved,
            created_at: at(2023, 10, 26, 0, 0),
        },
    ]
}

fn announcements() -> Vec<Announcement> {
    vec![
        Announcement {
            id: "A1".to_string(),
            content: "平台将于午夜进行系统维护，请提前安排好您的订单。".to_string(),
            created_at: at(2023, 10, 28, 0, 0),
            is_active: true,
        },
        Announcement {
            id: "A2".to_string(),
            content: "国庆节活动上线！充值即送好礼，详情请见活动页面。".to_string(),
            created_at: at(2023, 9, 30, 0, 0),
            is_active: true,
        },
        Announcement {
            id: "A3".to_string(),
            content: "严禁使用第三方插件，一经发现将永久封号处理。".to_string(),
            created_at: at(2023, 9, 15, 0, 0),
            is_active: false,
        },
    ]
}

fn ad_slots() -> Vec<AdSlot> {
    [
        ("ad-slot-1", "广告位 1 (首页)", "这是一个推广活动"),
        ("ad-slot-2", "广告位 2 (分类页)", "分类页专属优惠"),
        ("ad-slot-3", "广告位 3 (个人中心)", "邀请好友得奖励"),
        ("ad-slot-4", "广告位 4 (个人中心)", "成为VIP打手"),
    ]
    .into_iter()
    .map(|(id, name, content)| AdSlot {
        id: id.to_string(),
        name: name.to_string(),
        content: content.to_string(),
        link: "#".to_string(),
    })
    .collect()
}

/// Build the full demo data set.
pub fn mock_data() -> StoreData {
    let products = products();
    let users = users();
    let orders = orders(&products, &users);

    StoreData {
        orders,
        products,
        users,
        bounties: bounties(),
        teams: teams(),
        complaints: complaints(),
        announcements: announcements(),
        ad_slots: ad_slots(),
        ledger: Vec::new(),
        settings: PlatformSettings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_orders_respect_timestamp_invariants() {
        let data = mock_data();
        for o in &data.orders {
            let accepted = matches!(
                o.status,
                OrderStatus::InProgress | OrderStatus::PendingSettlement | OrderStatus::Completed
            );
            assert_eq!(o.accept_time.is_some(), accepted, "order {}", o.id);
            assert_eq!(o.hitter_id.is_some(), accepted, "order {}", o.id);
            assert_eq!(o.hitter_earnings.is_some(), accepted, "order {}", o.id);
            assert_eq!(o.completion_time.is_some(), o.status == OrderStatus::Completed);
        }
    }

    #[test]
    fn seed_freezing_balance_matches_unsettled_orders() {
        let data = mock_data();
        let unsettled: i64 = data
            .orders
            .iter()
            .filter(|o| o.hitter_id.as_deref() == Some("U2"))
            .filter(|o| matches!(o.status, OrderStatus::InProgress | OrderStatus::PendingSettlement))
            .filter_map(|o| o.hitter_earnings)
            .sum();
        let hitter = data.users.iter().find(|u| u.id == "U2").map(|u| u.freezing_balance);
        assert_eq!(hitter, Some(unsettled));
    }

    #[test]
    fn seed_bounties_within_capacity() {
        for b in mock_data().bounties {
            assert!(b.participants <= b.max_participants);
        }
    }
}
