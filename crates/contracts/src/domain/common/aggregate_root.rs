use super::AggregateId;
use crate::shared::pagination::{CollectionSpec, SortOrder};

/// Трейт для корня агрегата
///
/// Каждый агрегат хранится документом в своей коллекции. Статические методы
/// описывают коллекцию: имя, поле сортировки листинга и размер страницы.
pub trait AggregateRoot {
    /// Тип идентификатора агрегата
    type Id: AggregateId;

    // ============================================================================
    // Методы экземпляра
    // ============================================================================

    /// Получить ID записи
    fn id(&self) -> Self::Id;

    // ============================================================================
    // Метаданные класса агрегата (статические данные)
    // ============================================================================

    /// Имя коллекции в хранилище документов (например, "featured_news")
    fn collection_name() -> &'static str;

    /// Поле документа, по которому упорядочен листинг
    fn sort_field() -> &'static str;

    fn sort_order() -> SortOrder;

    /// Количество записей на странице листинга
    fn page_size() -> usize;

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    /// Параметры листинга коллекции
    fn collection_spec() -> CollectionSpec {
        CollectionSpec {
            collection: Self::collection_name(),
            sort_field: Self::sort_field(),
            sort_order: Self::sort_order(),
            page_size: Self::page_size(),
        }
    }
}
