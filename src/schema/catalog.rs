//! Built-in operation catalog.
//!
//! One table per API section. Quotas are the documented bucket sizes and
//! restore rates, expressed as units restored per hour.

use super::{Category, OperationDescriptor, ParameterRule, ParameterSchema, Quota, WireType};

/// Orders API section.
pub const ORDERS: Category = Category::new("Orders", "/Orders/2013-09-01", "2013-09-01");
/// Sellers API section.
pub const SELLERS: Category = Category::new("Sellers", "/Sellers/2011-07-01", "2011-07-01");
/// Reports API section.
pub const REPORTS: Category = Category::new("Reports", "/", "2009-01-01");
/// Feeds API section.
pub const FEEDS: Category = Category::new("Feeds", "/", "2009-01-01");
/// Products API section.
pub const PRODUCTS: Category = Category::new("Products", "/Products/2011-10-01", "2011-10-01");
/// Fulfillment Inventory API section.
pub const FULFILLMENT_INVENTORY: Category = Category::new(
    "FulfillmentInventory",
    "/FulfillmentInventory/2010-10-01",
    "2010-10-01",
);
/// Finances API section.
pub const FINANCES: Category = Category::new("Finances", "/Finances/2015-05-01", "2015-05-01");

const BOOLEAN: WireType = WireType::Other("xs:boolean");

const ORDER_STATUSES: &[&str] = &[
    "PendingAvailability",
    "Pending",
    "Unshipped",
    "PartiallyShipped",
    "Shipped",
    "InvoiceUnconfirmed",
    "Canceled",
    "Unfulfillable",
];

const REPORT_PROCESSING_STATUSES: &[&str] = &[
    "_SUBMITTED_",
    "_IN_PROGRESS_",
    "_CANCELLED_",
    "_DONE_",
    "_DONE_NO_DATA_",
];

const FEED_PROCESSING_STATUSES: &[&str] = &[
    "_AWAITING_ASYNCHRONOUS_REPLY_",
    "_CANCELLED_",
    "_DONE_",
    "_IN_PROGRESS_",
    "_IN_SAFETY_NET_",
    "_SUBMITTED_",
    "_UNCONFIRMED_",
];

const NEXT_TOKEN_PARAMS: ParameterSchema = &[("NextToken", ParameterRule::string().required())];
const NO_PARAMS: ParameterSchema = &[];

// Orders

const ORDERS_QUOTA: Quota = Quota::new(6, 60.0);
const ORDER_ITEMS_QUOTA: Quota = Quota::new(30, 1800.0);
const SERVICE_STATUS_QUOTA: Quota = Quota::new(2, 12.0);

const LIST_ORDERS_PARAMS: ParameterSchema = &[
    ("CreatedAfter", ParameterRule::date_time()),
    ("CreatedBefore", ParameterRule::date_time()),
    ("LastUpdatedAfter", ParameterRule::date_time()),
    ("LastUpdatedBefore", ParameterRule::date_time()),
    (
        "OrderStatus",
        ParameterRule::string()
            .one_of(ORDER_STATUSES)
            .list("OrderStatus.Status"),
    ),
    (
        "MarketplaceId",
        ParameterRule::string()
            .required()
            .list("MarketplaceId.Id")
            .list_max(50),
    ),
    (
        "FulfillmentChannel",
        ParameterRule::string()
            .one_of(&["AFN", "MFN"])
            .list("FulfillmentChannel.Channel"),
    ),
    (
        "PaymentMethod",
        ParameterRule::string()
            .one_of(&["COD", "CVS", "Other"])
            .list("PaymentMethod.Method"),
    ),
    ("BuyerEmail", ParameterRule::string()),
    ("SellerOrderId", ParameterRule::string()),
    ("MaxResultsPerPage", ParameterRule::int().range(1, 100)),
];

const GET_ORDER_PARAMS: ParameterSchema = &[(
    "AmazonOrderId",
    ParameterRule::string()
        .required()
        .list("AmazonOrderId.Id")
        .list_max(50),
)];

const LIST_ORDER_ITEMS_PARAMS: ParameterSchema =
    &[("AmazonOrderId", ParameterRule::string().required())];

/// Orders operations.
pub const ORDERS_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("ListOrders", ORDERS)
        .parameters(LIST_ORDERS_PARAMS)
        .quota(ORDERS_QUOTA),
    OperationDescriptor::new("ListOrdersByNextToken", ORDERS)
        .parameters(NEXT_TOKEN_PARAMS)
        .quota(ORDERS_QUOTA),
    OperationDescriptor::new("GetOrder", ORDERS)
        .parameters(GET_ORDER_PARAMS)
        .quota(ORDERS_QUOTA),
    OperationDescriptor::new("ListOrderItems", ORDERS)
        .parameters(LIST_ORDER_ITEMS_PARAMS)
        .quota(ORDER_ITEMS_QUOTA),
    OperationDescriptor::new("ListOrderItemsByNextToken", ORDERS)
        .parameters(NEXT_TOKEN_PARAMS)
        .quota(ORDER_ITEMS_QUOTA),
    OperationDescriptor::new("GetServiceStatus", ORDERS)
        .parameters(NO_PARAMS)
        .quota(SERVICE_STATUS_QUOTA),
];

// Sellers

const PARTICIPATIONS_QUOTA: Quota = Quota::new(15, 60.0);

/// Sellers operations.
pub const SELLERS_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("ListMarketplaceParticipations", SELLERS)
        .parameters(NO_PARAMS)
        .quota(PARTICIPATIONS_QUOTA),
    OperationDescriptor::new("ListMarketplaceParticipationsByNextToken", SELLERS)
        .parameters(NEXT_TOKEN_PARAMS)
        .quota(PARTICIPATIONS_QUOTA),
];

// Reports

const REQUEST_REPORT_PARAMS: ParameterSchema = &[
    ("ReportType", ParameterRule::string().required()),
    ("StartDate", ParameterRule::date_time()),
    ("EndDate", ParameterRule::date_time()),
    ("ReportOptions", ParameterRule::string()),
    (
        "MarketplaceIdList",
        ParameterRule::string().list("MarketplaceIdList.Id"),
    ),
];

const GET_REPORT_REQUEST_LIST_PARAMS: ParameterSchema = &[
    (
        "ReportRequestIdList",
        ParameterRule::string().list("ReportRequestIdList.Id"),
    ),
    (
        "ReportTypeList",
        ParameterRule::string().list("ReportTypeList.Type"),
    ),
    (
        "ReportProcessingStatusList",
        ParameterRule::string()
            .one_of(REPORT_PROCESSING_STATUSES)
            .list("ReportProcessingStatusList.Status"),
    ),
    ("MaxCount", ParameterRule::int().range(1, 100)),
    ("RequestedFromDate", ParameterRule::date_time()),
    ("RequestedToDate", ParameterRule::date_time()),
];

const GET_REPORT_LIST_PARAMS: ParameterSchema = &[
    ("MaxCount", ParameterRule::int().range(1, 100)),
    (
        "ReportTypeList",
        ParameterRule::string().list("ReportTypeList.Type"),
    ),
    ("Acknowledged", ParameterRule::new(BOOLEAN)),
    (
        "ReportRequestIdList",
        ParameterRule::string().list("ReportRequestIdList.Id"),
    ),
    ("AvailableFromDate", ParameterRule::date_time()),
    ("AvailableToDate", ParameterRule::date_time()),
];

const GET_REPORT_PARAMS: ParameterSchema = &[("ReportId", ParameterRule::string().required())];

/// Reports operations.
pub const REPORTS_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("RequestReport", REPORTS)
        .parameters(REQUEST_REPORT_PARAMS)
        .quota(Quota::new(15, 60.0)),
    OperationDescriptor::new("GetReportRequestList", REPORTS)
        .parameters(GET_REPORT_REQUEST_LIST_PARAMS)
        .quota(Quota::new(10, 80.0)),
    OperationDescriptor::new("GetReportList", REPORTS)
        .parameters(GET_REPORT_LIST_PARAMS)
        .quota(Quota::new(10, 80.0)),
    OperationDescriptor::new("GetReport", REPORTS)
        .parameters(GET_REPORT_PARAMS)
        .quota(Quota::new(15, 60.0)),
];

// Feeds

const SUBMIT_FEED_PARAMS: ParameterSchema = &[
    ("FeedType", ParameterRule::string().required()),
    (
        "MarketplaceIdList",
        ParameterRule::string().list("MarketplaceIdList.Id"),
    ),
    ("PurgeAndReplace", ParameterRule::new(BOOLEAN)),
];

const GET_FEED_SUBMISSION_LIST_PARAMS: ParameterSchema = &[
    (
        "FeedSubmissionIdList",
        ParameterRule::string().list("FeedSubmissionIdList.Id"),
    ),
    ("MaxCount", ParameterRule::int().range(1, 100)),
    ("FeedTypeList", ParameterRule::string().list("FeedTypeList.Type")),
    (
        "FeedProcessingStatusList",
        ParameterRule::string()
            .one_of(FEED_PROCESSING_STATUSES)
            .list("FeedProcessingStatusList.Status"),
    ),
    ("SubmittedFromDate", ParameterRule::date_time()),
    ("SubmittedToDate", ParameterRule::date_time()),
];

const GET_FEED_SUBMISSION_RESULT_PARAMS: ParameterSchema =
    &[("FeedSubmissionId", ParameterRule::string().required())];

/// Feeds operations.
pub const FEEDS_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("SubmitFeed", FEEDS)
        .parameters(SUBMIT_FEED_PARAMS)
        .quota(Quota::new(15, 30.0)),
    OperationDescriptor::new("GetFeedSubmissionList", FEEDS)
        .parameters(GET_FEED_SUBMISSION_LIST_PARAMS)
        .quota(Quota::new(10, 80.0)),
    OperationDescriptor::new("GetFeedSubmissionResult", FEEDS)
        .parameters(GET_FEED_SUBMISSION_RESULT_PARAMS)
        .quota(Quota::new(15, 60.0)),
];

// Products

const LIST_MATCHING_PRODUCTS_PARAMS: ParameterSchema = &[
    ("MarketplaceId", ParameterRule::string().required()),
    ("Query", ParameterRule::string().required()),
    ("QueryContextId", ParameterRule::string()),
];

const GET_MATCHING_PRODUCT_FOR_ID_PARAMS: ParameterSchema = &[
    ("MarketplaceId", ParameterRule::string().required()),
    (
        "IdType",
        ParameterRule::string()
            .required()
            .one_of(&["ASIN", "GCID", "SellerSKU", "UPC", "EAN", "ISBN", "JAN"]),
    ),
    (
        "IdList",
        ParameterRule::string().required().list("IdList.Id").list_max(5),
    ),
];

const GET_COMPETITIVE_PRICING_FOR_ASIN_PARAMS: ParameterSchema = &[
    ("MarketplaceId", ParameterRule::string().required()),
    (
        "ASINList",
        ParameterRule::string()
            .required()
            .list("ASINList.ASIN")
            .list_max(20),
    ),
];

const GET_LOWEST_PRICED_OFFERS_FOR_ASIN_PARAMS: ParameterSchema = &[
    ("MarketplaceId", ParameterRule::string().required()),
    ("ASIN", ParameterRule::string().required()),
    (
        "ItemCondition",
        ParameterRule::string()
            .required()
            .one_of(&["New", "Used", "Collectible", "Refurbished", "Club"]),
    ),
];

/// Products operations.
pub const PRODUCTS_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("ListMatchingProducts", PRODUCTS)
        .parameters(LIST_MATCHING_PRODUCTS_PARAMS)
        .quota(Quota::new(20, 720.0)),
    OperationDescriptor::new("GetMatchingProductForId", PRODUCTS)
        .parameters(GET_MATCHING_PRODUCT_FOR_ID_PARAMS)
        .quota(Quota::new(20, 18000.0)),
    OperationDescriptor::new("GetCompetitivePricingForASIN", PRODUCTS)
        .parameters(GET_COMPETITIVE_PRICING_FOR_ASIN_PARAMS)
        .quota(Quota::new(20, 36000.0)),
    OperationDescriptor::new("GetLowestPricedOffersForASIN", PRODUCTS)
        .parameters(GET_LOWEST_PRICED_OFFERS_FOR_ASIN_PARAMS)
        .quota(Quota::new(10, 18000.0)),
];

// Fulfillment inventory

const LIST_INVENTORY_SUPPLY_PARAMS: ParameterSchema = &[
    (
        "SellerSkus",
        ParameterRule::string().list("SellerSkus.member").list_max(50),
    ),
    ("QueryStartDateTime", ParameterRule::date_time()),
    (
        "ResponseGroup",
        ParameterRule::string().one_of(&["Basic", "Detailed"]),
    ),
    ("MarketplaceId", ParameterRule::string()),
];

/// Fulfillment Inventory operations.
pub const FULFILLMENT_INVENTORY_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("ListInventorySupply", FULFILLMENT_INVENTORY)
        .parameters(LIST_INVENTORY_SUPPLY_PARAMS)
        .quota(Quota::new(30, 7200.0)),
    OperationDescriptor::new("ListInventorySupplyByNextToken", FULFILLMENT_INVENTORY)
        .parameters(NEXT_TOKEN_PARAMS)
        .quota(Quota::new(30, 7200.0)),
];

// Finances

const LIST_FINANCIAL_EVENT_GROUPS_PARAMS: ParameterSchema = &[
    ("MaxResultsPerPage", ParameterRule::int().range(1, 100)),
    (
        "FinancialEventGroupStartedAfter",
        ParameterRule::date_time().required(),
    ),
    ("FinancialEventGroupStartedBefore", ParameterRule::date_time()),
];

const LIST_FINANCIAL_EVENTS_PARAMS: ParameterSchema = &[
    ("MaxResultsPerPage", ParameterRule::int().range(1, 100)),
    ("AmazonOrderId", ParameterRule::string()),
    ("FinancialEventGroupId", ParameterRule::string()),
    ("PostedAfter", ParameterRule::date_time()),
    ("PostedBefore", ParameterRule::date_time()),
];

const FINANCES_QUOTA: Quota = Quota::new(30, 1800.0);

/// Finances operations.
pub const FINANCES_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor::new("ListFinancialEventGroups", FINANCES)
        .parameters(LIST_FINANCIAL_EVENT_GROUPS_PARAMS)
        .quota(FINANCES_QUOTA),
    OperationDescriptor::new("ListFinancialEvents", FINANCES)
        .parameters(LIST_FINANCIAL_EVENTS_PARAMS)
        .quota(FINANCES_QUOTA),
    OperationDescriptor::new("ListFinancialEventsByNextToken", FINANCES)
        .parameters(NEXT_TOKEN_PARAMS)
        .quota(FINANCES_QUOTA),
];

/// Every built-in table, in registration order.
pub const ALL: &[&[OperationDescriptor]] = &[
    ORDERS_OPERATIONS,
    SELLERS_OPERATIONS,
    REPORTS_OPERATIONS,
    FEEDS_OPERATIONS,
    PRODUCTS_OPERATIONS,
    FULFILLMENT_INVENTORY_OPERATIONS,
    FINANCES_OPERATIONS,
];
