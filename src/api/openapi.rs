//! OpenAPI document for the REST surface.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{
    AdminTicketDto, BuyerInfoDto, ContactMessageRequest, CreateListingRequest, InboxItemDto,
    InboxListResponse, ListingDto, PaginationMeta, PartnerRequestRequest, PurchaseRequestDto,
    PurchaseResponse, TicketDto, UpdateStatusRequest,
};
use super::handlers::listings::TicketListResponse;
use super::handlers::system::HealthResponse;
use super::handlers::{inbox, listings, purchase, system};
use crate::error::ErrorResponse;

/// Generated OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "ticket-gateway",
        description = "Ticket reservation, private event listings, and admin inbox triage."
    ),
    paths(
        purchase::purchase_tickets,
        purchase::get_ticket,
        listings::create_listing,
        listings::get_listing,
        listings::get_shared_listing,
        listings::list_event_tickets,
        inbox::submit_contact_message,
        inbox::submit_partner_request,
        inbox::list_contact_messages,
        inbox::list_partner_requests,
        inbox::update_contact_message,
        inbox::update_partner_request,
        system::health_handler,
    ),
    components(schemas(
        AdminTicketDto,
        BuyerInfoDto,
        ContactMessageRequest,
        CreateListingRequest,
        ErrorResponse,
        HealthResponse,
        InboxItemDto,
        InboxListResponse,
        ListingDto,
        PaginationMeta,
        PartnerRequestRequest,
        PurchaseRequestDto,
        PurchaseResponse,
        TicketDto,
        TicketListResponse,
        UpdateStatusRequest,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Purchase", description = "Ticket purchase and lookup"),
        (name = "Events", description = "Private event listings and share links"),
        (name = "Inbox", description = "Public contact and partner forms"),
        (name = "Admin", description = "Admin triage; bearer token required when configured"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme used by admin routes.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
