use migration::entities::{api_token, customer, domain, event, link, user, workspace};

use crate::storage::models::{
    AnalyticsEvent, ApiToken, Customer, Domain, DomainType, Link, Plan, User, Workspace,
};

pub fn model_to_workspace(model: workspace::Model) -> Workspace {
    let plan = Plan::parse_lossy(&model.plan);
    Workspace {
        id: model.id,
        name: model.name,
        slug: model.slug,
        plan,
        usage: model.usage,
        usage_limit: model.usage_limit,
        domains_limit: plan.domains_limit(),
        created_at: model.created_at,
    }
}

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        created_at: model.created_at,
    }
}

pub fn model_to_token(model: api_token::Model) -> ApiToken {
    ApiToken {
        id: model.id,
        name: model.name,
        hashed_key: model.hashed_key,
        partial_key: model.partial_key,
        user_id: model.user_id,
        workspace_id: model.workspace_id,
        expires_at: model.expires_at,
        last_used: model.last_used,
        created_at: model.created_at,
    }
}

pub fn model_to_domain(model: domain::Model) -> Domain {
    Domain {
        id: model.id,
        slug: model.slug,
        workspace_id: model.workspace_id,
        verified: model.verified,
        primary: model.primary,
        archived: model.archived,
        noindex: model.noindex,
        placeholder: model.placeholder,
        expired_url: model.expired_url,
        target: model.target,
        domain_type: model.domain_type.parse().unwrap_or(DomainType::Redirect),
        clicks: model.clicks.max(0),
        created_at: model.created_at,
    }
}

pub fn domain_to_active_model(d: &Domain) -> domain::ActiveModel {
    use sea_orm::ActiveValue::*;

    domain::ActiveModel {
        id: Set(d.id.clone()),
        slug: Set(d.slug.clone()),
        workspace_id: Set(d.workspace_id.clone()),
        verified: Set(d.verified),
        primary: Set(d.primary),
        archived: Set(d.archived),
        noindex: Set(d.noindex),
        placeholder: Set(d.placeholder.clone()),
        expired_url: Set(d.expired_url.clone()),
        target: Set(d.target.clone()),
        domain_type: Set(d.domain_type.as_ref().to_string()),
        clicks: Set(d.clicks),
        created_at: Set(d.created_at),
    }
}

pub fn model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        workspace_id: model.workspace_id,
        domain: model.domain,
        key: model.key,
        url: model.url,
        clicks: model.clicks.max(0),
        leads: model.leads.max(0),
        sales: model.sales.max(0),
        sale_amount: model.sale_amount.max(0),
        expires_at: model.expires_at,
        created_at: model.created_at,
    }
}

pub fn link_to_active_model(l: &Link) -> link::ActiveModel {
    use sea_orm::ActiveValue::*;

    link::ActiveModel {
        id: Set(l.id.clone()),
        workspace_id: Set(l.workspace_id.clone()),
        domain: Set(l.domain.clone()),
        key: Set(l.key.clone()),
        url: Set(l.url.clone()),
        clicks: Set(l.clicks),
        leads: Set(l.leads),
        sales: Set(l.sales),
        sale_amount: Set(l.sale_amount),
        expires_at: Set(l.expires_at),
        created_at: Set(l.created_at),
    }
}

pub fn model_to_customer(model: customer::Model) -> Customer {
    Customer {
        id: model.id,
        workspace_id: model.workspace_id,
        external_id: model.external_id,
        name: model.name,
        email: model.email,
        link_id: model.link_id,
        click_id: model.click_id,
        created_at: model.created_at,
    }
}

pub fn model_to_event(model: event::Model) -> AnalyticsEvent {
    AnalyticsEvent {
        id: model.id,
        workspace_id: model.workspace_id,
        event: model.event,
        timestamp: model.timestamp,
        click_id: model.click_id,
        link_id: model.link_id,
        domain: model.domain,
        key: model.key,
        url: model.url,
        qr: model.qr,
        continent: model.continent,
        country: model.country,
        city: model.city,
        region: model.region,
        device: model.device,
        browser: model.browser,
        os: model.os,
        referer: model.referer,
        referer_url: model.referer_url,
        ip: model.ip,
        event_name: model.event_name,
        customer_id: model.customer_id,
        customer_name: model.customer_name,
        customer_email: model.customer_email,
        invoice_id: model.invoice_id,
        amount: model.amount,
        currency: model.currency,
        payment_processor: model.payment_processor,
    }
}

pub fn event_to_active_model(e: &AnalyticsEvent) -> event::ActiveModel {
    use sea_orm::ActiveValue::*;

    event::ActiveModel {
        id: Set(e.id.clone()),
        workspace_id: Set(e.workspace_id.clone()),
        event: Set(e.event.clone()),
        timestamp: Set(e.timestamp),
        click_id: Set(e.click_id.clone()),
        link_id: Set(e.link_id.clone()),
        domain: Set(e.domain.clone()),
        key: Set(e.key.clone()),
        url: Set(e.url.clone()),
        qr: Set(e.qr),
        continent: Set(e.continent.clone()),
        country: Set(e.country.clone()),
        city: Set(e.city.clone()),
        region: Set(e.region.clone()),
        device: Set(e.device.clone()),
        browser: Set(e.browser.clone()),
        os: Set(e.os.clone()),
        referer: Set(e.referer.clone()),
        referer_url: Set(e.referer_url.clone()),
        ip: Set(e.ip.clone()),
        event_name: Set(e.event_name.clone()),
        customer_id: Set(e.customer_id.clone()),
        customer_name: Set(e.customer_name.clone()),
        customer_email: Set(e.customer_email.clone()),
        invoice_id: Set(e.invoice_id.clone()),
        amount: Set(e.amount),
        currency: Set(e.currency.clone()),
        payment_processor: Set(e.payment_processor.clone()),
    }
}
