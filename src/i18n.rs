//! Localized message templates
//!
//! A fixed lookup table from language to the phrases the assistant uses.
//! Every reply the engine composes itself comes from here. Unsupported
//! languages fall back to English.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the assistant can answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (default)
    #[default]
    English,
    /// Hebrew
    Hebrew,
    /// French
    French,
    /// Spanish
    Spanish,
    /// Italian
    Italian,
    /// Arabic
    Arabic,
    /// Russian
    Russian,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Hebrew,
        Language::French,
        Language::Spanish,
        Language::Italian,
        Language::Arabic,
        Language::Russian,
    ];

    /// Two-letter ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hebrew => "he",
            Self::French => "fr",
            Self::Spanish => "es",
            Self::Italian => "it",
            Self::Arabic => "ar",
            Self::Russian => "ru",
        }
    }

    /// Parse a language code
    ///
    /// Accepts ISO 639-1 codes, region-tagged codes (`fr-CA`, `en_GB`) and
    /// the legacy `iw` code for Hebrew. Returns `None` for unsupported
    /// languages.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpy::i18n::Language;
    ///
    /// assert_eq!(Language::from_code("fr-CA"), Some(Language::French));
    /// assert_eq!(Language::from_code("iw"), Some(Language::Hebrew));
    /// assert_eq!(Language::from_code("de"), None);
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match primary.as_str() {
            "en" => Some(Self::English),
            "he" | "iw" => Some(Self::Hebrew),
            "fr" => Some(Self::French),
            "es" => Some(Self::Spanish),
            "it" => Some(Self::Italian),
            "ar" => Some(Self::Arabic),
            "ru" => Some(Self::Russian),
            _ => None,
        }
    }

    /// Message table for this language
    pub fn messages(self) -> &'static Messages {
        match self {
            Self::English => &EN,
            Self::Hebrew => &HE,
            Self::French => &FR,
            Self::Spanish => &ES,
            Self::Italian => &IT,
            Self::Arabic => &AR,
            Self::Russian => &RU,
        }
    }

    /// Language whose salutation opens `text`, if any
    ///
    /// ```
    /// use helpy::i18n::Language;
    ///
    /// assert_eq!(Language::from_greeting("Bonjour!"), Some(Language::French));
    /// assert_eq!(Language::from_greeting("Hi there"), Some(Language::English));
    /// assert_eq!(Language::from_greeting("stop 123"), None);
    /// ```
    pub fn from_greeting(text: &str) -> Option<Self> {
        let first = text
            .split_whitespace()
            .next()?
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if first.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|language| language.messages().greetings.contains(&first.as_str()))
    }

    /// Whether `text` is an exit keyword in this language
    ///
    /// English keywords are accepted in every session, so a user who typed
    /// the first message in French can still leave with `exit`.
    pub fn is_exit_keyword(self, text: &str) -> bool {
        let normalized = text.trim().to_lowercase();
        self.messages().exit_keywords.contains(&normalized.as_str())
            || EN.exit_keywords.contains(&normalized.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Answer to a yes/no follow-up question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    /// Affirmative
    Yes,
    /// Negative
    No,
    /// Anything else
    Unclear,
}

/// Per-language message table
///
/// Templates use `{name}` placeholders which are filled by the formatting
/// helpers below.
#[derive(Debug)]
pub struct Messages {
    /// Onboarding text asking for the stop number
    pub greeting: &'static str,
    /// `{stop}`, `{line}`, `{agency}`, `{times}`
    pub eta_reply: &'static str,
    /// `{stop}`, `{lines}`
    pub lines_at_stop: &'static str,
    /// `{stop}`, `{line}`; followed by the numbered options
    pub ambiguous_operator: &'static str,
    /// Zero operators serve the line at the stop
    pub no_operator: &'static str,
    /// `{line}`; every computed ETA is in the past or there are none
    pub no_arrivals: &'static str,
    /// Upstream real-time feed failed
    pub feed_unavailable: &'static str,
    /// `{stop}`; stop unknown to the static tables
    pub stop_not_found: &'static str,
    /// Oracle arguments failed validation
    pub invalid_parameters: &'static str,
    /// Disambiguation answer out of range; followed by the options
    pub invalid_choice: &'static str,
    /// Catch-all
    pub generic_error: &'static str,
    /// Empty user message
    pub empty_input: &'static str,
    /// Farewell on exit keyword
    pub goodbye: &'static str,
    /// Farewell on terminal inactivity timeout
    pub inactive: &'static str,
    /// Notice sent before slow static lookups
    pub wait: &'static str,
    /// Terminal follow-up question after an ETA reply
    pub follow_up: &'static str,
    /// Reply to a positive follow-up answer
    pub continuation: &'static str,
    /// Reply to an unclear follow-up answer
    pub yes_no_hint: &'static str,
    /// Prefix of service alert messages
    pub warning_prefix: &'static str,
    /// Salutations that identify the language on their own
    pub greetings: &'static [&'static str],
    /// Words that end the session
    pub exit_keywords: &'static [&'static str],
    /// Affirmative answers
    pub positive: &'static [&'static str],
    /// Negative answers
    pub negative: &'static [&'static str],
}

impl Messages {
    /// ETA reply showing at most `limit` arrivals
    ///
    /// `None` entries (vehicles already due) are skipped. When nothing
    /// remains the "no upcoming arrivals" variant is returned instead of
    /// the numeric template.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpy::i18n::Language;
    ///
    /// let text = Language::English.messages().eta_reply(
    ///     "123", "5", "Egged / Egged", &[None, Some(4), Some(12), Some(20), Some(31)], 3,
    /// );
    /// assert_eq!(
    ///     text,
    ///     "For stop 123, line 5 operated by Egged / Egged, the next arrivals are in: 4, 12, 20 minutes."
    /// );
    /// ```
    pub fn eta_reply(
        &self,
        stop: &str,
        line: &str,
        agency: &str,
        etas: &[Option<i64>],
        limit: usize,
    ) -> String {
        let shown: Vec<String> = etas
            .iter()
            .flatten()
            .take(limit)
            .map(|minutes| minutes.to_string())
            .collect();

        if shown.is_empty() {
            return self.no_arrivals_reply(line);
        }

        fill(
            self.eta_reply,
            &[
                ("stop", stop),
                ("line", line),
                ("agency", agency),
                ("times", &shown.join(", ")),
            ],
        )
    }

    /// "No upcoming arrivals" reply
    pub fn no_arrivals_reply(&self, line: &str) -> String {
        fill(self.no_arrivals, &[("line", line)])
    }

    /// Lines-at-stop reply
    pub fn lines_reply(&self, stop: &str, lines: &[String]) -> String {
        fill(
            self.lines_at_stop,
            &[("stop", stop), ("lines", &lines.join(", "))],
        )
    }

    /// Operator selection prompt followed by the numbered options
    pub fn ambiguous_reply(&self, stop: &str, line: &str, options: &[String]) -> String {
        let header = fill(self.ambiguous_operator, &[("stop", stop), ("line", line)]);
        with_options(&header, options)
    }

    /// Out-of-range selection followed by the numbered options again
    pub fn invalid_choice_reply(&self, options: &[String]) -> String {
        with_options(self.invalid_choice, options)
    }

    /// Stop-not-found reply
    pub fn stop_not_found_reply(&self, stop: &str) -> String {
        fill(self.stop_not_found, &[("stop", stop)])
    }

    /// Service alert line
    pub fn warning(&self, text: &str) -> String {
        format!("{}: {}", self.warning_prefix, text)
    }

    /// Classify a follow-up answer
    pub fn classify_yes_no(&self, answer: &str) -> YesNo {
        let normalized = answer.trim().to_lowercase();
        let normalized = normalized.as_str();
        if self.positive.contains(&normalized) || EN.positive.contains(&normalized) {
            YesNo::Yes
        } else if self.negative.contains(&normalized) || EN.negative.contains(&normalized) {
            YesNo::No
        } else {
            YesNo::Unclear
        }
    }
}

/// Substitute `{name}` placeholders in a single pass
///
/// Substituted values are never rescanned, so user-supplied text that looks
/// like a placeholder is copied verbatim. Unknown placeholders stay as-is.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn with_options(header: &str, options: &[String]) -> String {
    let mut text = header.to_string();
    for option in options {
        text.push('\n');
        text.push_str(option);
    }
    text
}

static EN: Messages = Messages {
    greeting: "Hello! I'm Helpy, your assistant! I'll let you know how long it will take for your next bus/train to arrive. To do this, I need you to tell me the station number where you are (it's written on the sign at the top of the stop). Thank you!",
    eta_reply: "For stop {stop}, line {line} operated by {agency}, the next arrivals are in: {times} minutes.",
    lines_at_stop: "At stop {stop}, the following lines pass through: {lines}.",
    ambiguous_operator: "Several operators run line {line} at stop {stop}. Please reply with the number of your operator:",
    no_operator: "No operators found for this line at this stop.",
    no_arrivals: "No upcoming arrivals found for line {line} at this stop in the next hour.",
    feed_unavailable: "The real-time arrivals service is unavailable right now. Please try again in a moment.",
    stop_not_found: "I couldn't find any lines for stop {stop}. Please check the stop number.",
    invalid_parameters: "Invalid transit request parameters.",
    invalid_choice: "Invalid choice. Please reply with one of the numbers below:",
    generic_error: "An error occurred while processing your request. Please try again.",
    empty_input: "I'm sorry, I didn't understand. Could you please provide more information?",
    goodbye: "Thank you for using Helpy. Goodbye!",
    inactive: "It seems you've been inactive. Ending the session. Goodbye!",
    wait: "Please wait a moment while I process your request.",
    follow_up: "Would you like to check another line or another station? (yes/no): ",
    continuation: "Let's continue checking transit times. What line or station would you like to check next?",
    yes_no_hint: "Please respond with 'yes' or 'no'.",
    warning_prefix: "WARNING",
    greetings: &["hello", "hi", "hey", "howdy"],
    exit_keywords: &["exit", "quit", "bye", "goodbye"],
    positive: &["yes", "y"],
    negative: &["no", "n"],
};

static HE: Messages = Messages {
    greeting: "שלום! אני הלפי, העוזר שלך! אני אגיד לך כמה זמן ייקח עד להגעת התחבורה הבאה שלך. כדי לעשות זאת, אני צריך שתאמר לי את מספר התחנה (המספר כתוב בשלט בראש התחנה). תודה!",
    eta_reply: "עבור תחנה {stop}, קו {line} מופעל על ידי {agency}, ההגעות הבאות הן בעוד: {times} דקות.",
    lines_at_stop: "בתחנה {stop}, הקווים הבאים עוברים: {lines}.",
    ambiguous_operator: "מספר מפעילים מפעילים את קו {line} בתחנה {stop}. אנא השב עם מספר המפעיל שלך:",
    no_operator: "לא נמצאו מפעילים עבור הקו הזה בתחנה הזו.",
    no_arrivals: "לא נמצאו הגעות קרובות לקו {line} בתחנה הזו בשעה הקרובה.",
    feed_unavailable: "שירות זמני ההגעה בזמן אמת אינו זמין כרגע. אנא נסה שוב בעוד רגע.",
    stop_not_found: "לא מצאתי קווים עבור תחנה {stop}. אנא בדוק את מספר התחנה.",
    invalid_parameters: "פרמטרים לא תקינים לבקשת התחבורה.",
    invalid_choice: "בחירה לא תקינה. אנא השב עם אחד המספרים הבאים:",
    generic_error: "אירעה שגיאה בעיבוד הבקשה שלך. אנא נסה שוב.",
    empty_input: "מצטער, לא הבנתי. תוכל לספק מידע נוסף?",
    goodbye: "תודה שהשתמשת בהלפי. להתראות!",
    inactive: "נראה שלא היית פעיל. מסיים את השיחה. להתראות!",
    wait: "אנא המתן רגע בעוד אני מעבד את בקשתך.",
    follow_up: "האם תרצה לבדוק קו נוסף או תחנה נוספת? (כן/לא): ",
    continuation: "בוא נמשיך לבדוק זמני נסיעה. איזה קו או תחנה תרצה לבדוק הבא?",
    yes_no_hint: "אנא השב 'כן' או 'לא'.",
    warning_prefix: "אזהרה",
    greetings: &["שלום", "היי"],
    exit_keywords: &["יציאה", "להתראות", "סיום"],
    positive: &["כן"],
    negative: &["לא"],
};

static FR: Messages = Messages {
    greeting: "Bonjour! Je suis Helpy, votre assistant! Je vais vous indiquer combien de temps il reste avant l'arrivée de votre prochain bus/train. Pour cela, j'ai besoin du numéro de l'arrêt où vous vous trouvez (il est écrit sur le panneau en haut de l'arrêt). Merci!",
    eta_reply: "Pour l'arrêt {stop}, la ligne {line} opérée par {agency}, les prochaines arrivées sont dans : {times} minutes.",
    lines_at_stop: "À l'arrêt {stop}, les lignes suivantes passent : {lines}.",
    ambiguous_operator: "Plusieurs opérateurs exploitent la ligne {line} à l'arrêt {stop}. Veuillez répondre avec le numéro de votre opérateur :",
    no_operator: "Aucun opérateur trouvé pour cette ligne à cet arrêt.",
    no_arrivals: "Aucune arrivée prévue pour la ligne {line} à cet arrêt dans la prochaine heure.",
    feed_unavailable: "Le service des horaires en temps réel est indisponible pour le moment. Veuillez réessayer dans un instant.",
    stop_not_found: "Je n'ai trouvé aucune ligne pour l'arrêt {stop}. Veuillez vérifier le numéro de l'arrêt.",
    invalid_parameters: "Paramètres de la demande de transport invalides.",
    invalid_choice: "Choix invalide. Veuillez répondre avec l'un des numéros ci-dessous :",
    generic_error: "Une erreur s'est produite lors du traitement de votre demande. Veuillez réessayer.",
    empty_input: "Désolé, je n'ai pas compris. Pourriez-vous donner plus d'informations ?",
    goodbye: "Merci d'avoir utilisé Helpy. Au revoir !",
    inactive: "Il semble que vous soyez inactif. Fin de la session. Au revoir !",
    wait: "Veuillez patienter un moment pendant que je traite votre demande.",
    follow_up: "Voulez-vous vérifier une autre ligne ou une autre station ? (oui/non) : ",
    continuation: "Continuons à vérifier les horaires. Quelle ligne ou station souhaitez-vous vérifier maintenant ?",
    yes_no_hint: "Veuillez répondre par 'oui' ou 'non'.",
    warning_prefix: "AVERTISSEMENT",
    greetings: &["bonjour", "salut", "bonsoir", "coucou"],
    exit_keywords: &["sortie", "quitter", "au revoir"],
    positive: &["oui", "o"],
    negative: &["non"],
};

static ES: Messages = Messages {
    greeting: "¡Hola! Soy Helpy, tu asistente. Te diré cuánto tiempo tomará para que llegue tu próximo autobús/tren. Para esto, necesito que me digas el número de estación donde estás (está escrito en el letrero en la parte superior de la parada). ¡Gracias!",
    eta_reply: "Para la parada {stop}, la línea {line} operada por {agency}, las próximas llegadas son en: {times} minutos.",
    lines_at_stop: "En la parada {stop}, pasan las siguientes líneas: {lines}.",
    ambiguous_operator: "Varios operadores prestan servicio en la línea {line} en la parada {stop}. Responde con el número de tu operador:",
    no_operator: "No se encontraron operadores para esta línea en esta parada.",
    no_arrivals: "No hay llegadas previstas para la línea {line} en esta parada durante la próxima hora.",
    feed_unavailable: "El servicio de llegadas en tiempo real no está disponible en este momento. Inténtalo de nuevo en un momento.",
    stop_not_found: "No encontré líneas para la parada {stop}. Verifica el número de la parada.",
    invalid_parameters: "Parámetros de la solicitud de transporte no válidos.",
    invalid_choice: "Opción no válida. Responde con uno de los números siguientes:",
    generic_error: "Se produjo un error al procesar tu solicitud. Inténtalo de nuevo.",
    empty_input: "Lo siento, no entendí. ¿Podrías darme más información?",
    goodbye: "Gracias por usar Helpy. ¡Adiós!",
    inactive: "Parece que has estado inactivo. Terminando la sesión. ¡Adiós!",
    wait: "Por favor, espere un momento mientras proceso su solicitud.",
    follow_up: "¿Te gustaría verificar otra línea u otra estación? (sí/no): ",
    continuation: "Sigamos verificando los tiempos de tránsito. ¿Qué línea o estación te gustaría verificar a continuación?",
    yes_no_hint: "Por favor, responde 'sí' o 'no'.",
    warning_prefix: "ADVERTENCIA",
    greetings: &["hola", "buenos", "buenas"],
    exit_keywords: &["salir", "adiós", "salida"],
    positive: &["sí", "si", "s"],
    negative: &["no", "n"],
};

static IT: Messages = Messages {
    greeting: "Ciao! Sono Helpy, il tuo assistente! Ti dirò quanto tempo ci vorrà prima che arrivi il tuo prossimo autobus/treno. Per farlo, ho bisogno che mi dici il numero della stazione in cui ti trovi (è scritto sul cartello in cima alla fermata). Grazie!",
    eta_reply: "Per la fermata {stop}, la linea {line} gestita da {agency}, i prossimi arrivi sono tra: {times} minuti.",
    lines_at_stop: "Alla fermata {stop}, passano le seguenti linee: {lines}.",
    ambiguous_operator: "Più operatori gestiscono la linea {line} alla fermata {stop}. Rispondi con il numero del tuo operatore:",
    no_operator: "Nessun operatore trovato per questa linea a questa fermata.",
    no_arrivals: "Nessun arrivo previsto per la linea {line} a questa fermata nella prossima ora.",
    feed_unavailable: "Il servizio degli arrivi in tempo reale non è disponibile al momento. Riprova tra poco.",
    stop_not_found: "Non ho trovato linee per la fermata {stop}. Controlla il numero della fermata.",
    invalid_parameters: "Parametri della richiesta di trasporto non validi.",
    invalid_choice: "Scelta non valida. Rispondi con uno dei numeri seguenti:",
    generic_error: "Si è verificato un errore durante l'elaborazione della richiesta. Riprova.",
    empty_input: "Mi dispiace, non ho capito. Potresti fornire più informazioni?",
    goodbye: "Grazie per aver utilizzato Helpy. Arrivederci!",
    inactive: "Sembra che tu sia inattivo. Chiudo la sessione. Arrivederci!",
    wait: "Per favore, aspetti un momento mentre elaboro la sua richiesta.",
    follow_up: "Vuoi controllare un'altra linea o un'altra stazione? (sì/no): ",
    continuation: "Continuiamo a controllare i tempi di transito. Quale linea o stazione vuoi controllare dopo?",
    yes_no_hint: "Per favore rispondi 'sì' o 'no'.",
    warning_prefix: "AVVISO",
    greetings: &["ciao", "buongiorno", "buonasera", "salve"],
    exit_keywords: &["esci", "uscita", "arrivederci"],
    positive: &["sì", "si", "s"],
    negative: &["no", "n"],
};

static AR: Messages = Messages {
    greeting: "مرحبًا! أنا Helpy، مساعدك! سأعلمك بالوقت الذي سيستغرقه وصول الحافلة/القطار التالي. للقيام بذلك، أحتاج منك أن تخبرني برقم المحطة التي تتواجد فيها (مكتوب على اللافتة في أعلى المحطة). شكرًا!",
    eta_reply: "للمحطة {stop}، الخط {line} الذي تديره {agency}، الوصول التالي خلال: {times} دقيقة.",
    lines_at_stop: "في المحطة {stop}، تمر الخطوط التالية: {lines}.",
    ambiguous_operator: "يوجد أكثر من مشغل للخط {line} في المحطة {stop}. يرجى الرد برقم المشغل الخاص بك:",
    no_operator: "لم يتم العثور على مشغلين لهذا الخط في هذه المحطة.",
    no_arrivals: "لا توجد رحلات قادمة للخط {line} في هذه المحطة خلال الساعة القادمة.",
    feed_unavailable: "خدمة مواعيد الوصول في الوقت الفعلي غير متاحة حاليًا. يرجى المحاولة مرة أخرى بعد قليل.",
    stop_not_found: "لم أجد أي خطوط للمحطة {stop}. يرجى التحقق من رقم المحطة.",
    invalid_parameters: "معلمات طلب النقل غير صالحة.",
    invalid_choice: "اختيار غير صالح. يرجى الرد بأحد الأرقام التالية:",
    generic_error: "حدث خطأ أثناء معالجة طلبك. يرجى المحاولة مرة أخرى.",
    empty_input: "عذرًا، لم أفهم. هل يمكنك تقديم مزيد من المعلومات؟",
    goodbye: "شكرًا لاستخدامك Helpy. وداعًا!",
    inactive: "يبدو أنك غير نشط. سيتم إنهاء الجلسة. وداعًا!",
    wait: "الرجاء الانتظار لحظة بينما أتعامل مع طلبك.",
    follow_up: "هل ترغب في التحقق من خط آخر أو محطة أخرى؟ (نعم/لا): ",
    continuation: "لنواصل التحقق من مواعيد النقل. ما الخط أو المحطة التي تريد التحقق منها بعد ذلك؟",
    yes_no_hint: "يرجى الرد بـ 'نعم' أو 'لا'.",
    warning_prefix: "تحذير",
    greetings: &["مرحبا", "مرحبًا", "السلام", "اهلا", "أهلا"],
    exit_keywords: &["خروج", "إنهاء", "وداعا", "إلى اللقاء"],
    positive: &["نعم"],
    negative: &["لا"],
};

static RU: Messages = Messages {
    greeting: "Привет! Я Helpy, ваш ассистент! Я сообщу вам, сколько времени потребуется, чтобы ваш следующий автобус/поезд прибыл. Для этого мне нужно, чтобы вы сказали мне номер станции, на которой вы находитесь (он написан на знаке в верхней части остановки). Спасибо!",
    eta_reply: "Для остановки {stop}, линия {line}, обслуживаемая {agency}, следующие прибытия через: {times} минут.",
    lines_at_stop: "На остановке {stop} проходят следующие линии: {lines}.",
    ambiguous_operator: "Линию {line} на остановке {stop} обслуживают несколько операторов. Пожалуйста, ответьте номером вашего оператора:",
    no_operator: "Операторы для этого маршрута на этой остановке не найдены.",
    no_arrivals: "В ближайший час прибытий по линии {line} на этой остановке не ожидается.",
    feed_unavailable: "Сервис прибытия в реальном времени сейчас недоступен. Пожалуйста, попробуйте чуть позже.",
    stop_not_found: "Я не нашёл линий для остановки {stop}. Пожалуйста, проверьте номер остановки.",
    invalid_parameters: "Неверные параметры запроса.",
    invalid_choice: "Неверный выбор. Пожалуйста, ответьте одним из номеров ниже:",
    generic_error: "При обработке вашего запроса произошла ошибка. Пожалуйста, попробуйте снова.",
    empty_input: "Извините, я не понял. Не могли бы вы уточнить?",
    goodbye: "Спасибо, что используете Helpy. До свидания!",
    inactive: "Похоже, вы неактивны. Завершаю сеанс. До свидания!",
    wait: "Пожалуйста, подождите немного, пока я обрабатываю ваш запрос.",
    follow_up: "Хотите проверить другую линию или другую остановку? (да/нет): ",
    continuation: "Продолжим проверять расписание. Какую линию или остановку вы хотите проверить дальше?",
    yes_no_hint: "Пожалуйста, ответьте 'да' или 'нет'.",
    warning_prefix: "ПРЕДУПРЕЖДЕНИЕ",
    greetings: &["привет", "здравствуйте", "добрый"],
    exit_keywords: &["выход", "выходить", "пока", "до свидания"],
    positive: &["да", "д"],
    negative: &["нет", "н"],
};
